use regex::Regex;

use crate::buffer::SourceBuffer;

/// How to find the splice point for one hook.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Exact text `head` immediately followed by `tail`. The fragment goes
    /// between the two, so the replacement is always `head + fragment + tail`.
    Literal { head: String, tail: String },
    /// Bounded-context pattern with named groups `prefix`, `anchor` and `suffix`.
    /// Only `anchor` is required; the fragment goes at the end of it.
    Context(Regex),
}

/// Byte offsets of a match: the whole matched span and the splice point within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLocation {
    pub start: usize,
    pub end: usize,
    pub insert_at: usize,
}

impl MatchStrategy {
    pub fn literal(head: impl Into<String>, tail: impl Into<String>) -> Self {
        MatchStrategy::Literal {
            head: head.into(),
            tail: tail.into(),
        }
    }

    /// Compile a context pattern, rejecting patterns without an `anchor` group.
    pub fn context(pattern: &str) -> Result<Self, String> {
        let re = Regex::new(pattern).map_err(|e| e.to_string())?;
        if !re.capture_names().flatten().any(|name| name == "anchor") {
            return Err(format!("pattern has no `anchor` group: {pattern}"));
        }
        Ok(MatchStrategy::Context(re))
    }

    /// Derive a whitespace-tolerant context strategy from a literal one.
    ///
    /// Tokens keep their order and any run of whitespace between them may grow or
    /// shrink, though never vanish. When `head` ends a line, the splice point stays pinned to
    /// that line break so the fragment still starts on a fresh line. Returns
    /// `None` for non-literal strategies.
    pub fn relaxed(&self) -> Option<Result<Self, String>> {
        let MatchStrategy::Literal { head, tail } = self else {
            return None;
        };
        Some(Self::context(&relaxed_pattern(head, tail)))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            MatchStrategy::Literal { .. } => "literal",
            MatchStrategy::Context(_) => "context",
        }
    }
}

fn relaxed_pattern(head: &str, tail: &str) -> String {
    let mut pattern = String::new();
    if head.trim().is_empty() {
        pattern.push_str("(?m)(?P<prefix>^)");
    } else {
        pattern.push_str("(?P<prefix>");
        pattern.push_str(&token_pattern(head));
        pattern.push(')');
    }
    if head.ends_with('\n') {
        pattern.push_str(r"(?P<anchor>[ \t]*\r?\n)");
    } else {
        pattern.push_str("(?P<anchor>)");
    }
    if !tail.trim().is_empty() {
        pattern.push_str(r"(?P<suffix>[ \t]*");
        pattern.push_str(&token_pattern(tail));
        pattern.push(')');
    }
    pattern
}

fn token_pattern(text: &str) -> String {
    text.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Find the first place `strategy` matches in `buffer`.
///
/// Only the first occurrence is considered; a second one is never searched for.
pub fn locate(buffer: &SourceBuffer, strategy: &MatchStrategy) -> Option<MatchLocation> {
    let text = buffer.as_str();
    match strategy {
        MatchStrategy::Literal { head, tail } => {
            let needle = format!("{head}{tail}");
            let start = text.find(&needle)?;
            Some(MatchLocation {
                start,
                end: start + needle.len(),
                insert_at: start + head.len(),
            })
        }
        MatchStrategy::Context(re) => {
            let caps = re.captures(text)?;
            let whole = caps.get(0)?;
            let anchor = caps.name("anchor")?;
            Some(MatchLocation {
                start: whole.start(),
                end: whole.end(),
                insert_at: anchor.end(),
            })
        }
    }
}
