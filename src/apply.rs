use serde::Serialize;

use crate::buffer::SourceBuffer;
use crate::catalogue::AnchorSpec;
use crate::matcher::{MatchLocation, locate};

/// What happened to one spec during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum ApplyOutcome {
    /// Inserted this run, using the strategy at index `strategy`.
    Applied { strategy: usize },
    /// The spec's marker was already in the buffer; nothing was inserted.
    AlreadyPresent,
    /// No strategy matched; the buffer is unchanged.
    NotFound,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }

    pub fn is_installed(&self) -> bool {
        !matches!(self, ApplyOutcome::NotFound)
    }
}

/// Insert `fragment` at the location's splice point.
pub fn splice(buffer: &SourceBuffer, location: MatchLocation, fragment: &str) -> SourceBuffer {
    buffer.splice(location.insert_at, fragment)
}

/// Apply one spec to `buffer`, at most once.
///
/// The marker check comes first, so re-running against an instrumented file
/// never duplicates a hook. Strategies are tried in order and the first hit wins.
pub fn apply(buffer: SourceBuffer, spec: &AnchorSpec) -> (SourceBuffer, ApplyOutcome) {
    if spec.is_present_in(buffer.as_str()) {
        tracing::debug!(hook = spec.name, "marker present, skipping");
        return (buffer, ApplyOutcome::AlreadyPresent);
    }

    for (index, strategy) in spec.strategies.iter().enumerate() {
        tracing::debug!(
            hook = spec.name,
            strategy = index,
            kind = strategy.describe(),
            "trying strategy"
        );
        if let Some(location) = locate(&buffer, strategy) {
            tracing::info!(
                hook = spec.name,
                strategy = index,
                offset = location.insert_at,
                "hook applied"
            );
            let next = splice(&buffer, location, &spec.fragment);
            return (next, ApplyOutcome::Applied { strategy: index });
        }
    }

    if spec.optional {
        tracing::debug!(hook = spec.name, "optional anchor not found");
    } else {
        tracing::warn!(hook = spec.name, "anchor not found");
    }
    (buffer, ApplyOutcome::NotFound)
}
