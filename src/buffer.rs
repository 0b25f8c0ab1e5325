/// An immutable snapshot of the amalgamation's text at one point in the pipeline.
///
/// Every transformation produces a new buffer; nothing is edited in place, so the
/// before and after of each step stay available for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Return a new buffer with `fragment` inserted at byte offset `at`.
    ///
    /// `at` must lie on a char boundary; offsets produced by the matcher always do.
    pub fn splice(&self, at: usize, fragment: &str) -> SourceBuffer {
        let mut text = String::with_capacity(self.text.len() + fragment.len());
        text.push_str(&self.text[..at]);
        text.push_str(fragment);
        text.push_str(&self.text[at..]);
        SourceBuffer { text }
    }
}

impl From<String> for SourceBuffer {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
