use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every replacement strategy (style, content, attribute) compiles down to
/// this single primitive. Intelligence lives in span acquisition, not
/// application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until apply() is called"]
pub struct TextEdit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("byte offset {0} is not on a UTF-8 character boundary")]
    NotCharBoundary(usize),
}

impl TextEdit {
    /// Create a new edit, capturing the current span text as the expected before-text.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before),
        }
    }

    /// Create an edit that replaces `span` of `source`, where `span` is a
    /// range already known to be in bounds.
    pub fn replace_span(source: &str, byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        let before = source.get(byte_start..byte_end).unwrap_or_default();
        Self::new(byte_start, byte_end, new_text, before)
    }

    /// Create a pure insertion at `offset`.
    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(offset, offset, new_text, "")
    }

    /// Validate the edit against the current text.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, source: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > source.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: source.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !source.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }

        let current = &source[self.byte_start..self.byte_end];
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Whether applying this edit to `source` would leave it unchanged.
    pub fn is_noop(&self, source: &str) -> bool {
        source.get(self.byte_start..self.byte_end) == Some(self.new_text.as_str())
    }

    /// Apply this edit, producing a new string. `source` is never mutated.
    pub fn apply(&self, source: &str) -> Result<String, EditError> {
        self.validate(source)?;

        let mut out = String::with_capacity(
            source.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        out.push_str(&source[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&source[self.byte_end..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_verification_exact_match() {
        let verify = EditVerification::ExactMatch("hello world".to_string());
        assert!(verify.matches("hello world"));
        assert!(!verify.matches("hello"));
    }

    #[test]
    fn test_edit_verification_from_text_large() {
        let text = "x".repeat(2000);
        let verify = EditVerification::from_text(&text);
        assert!(matches!(verify, EditVerification::Hash(_)));
        assert!(verify.matches(&text));
        assert!(!verify.matches("x"));
    }

    #[test]
    fn test_apply_replaces_span() {
        let edit = TextEdit::new(5, 7, "hello", "hi");
        assert_eq!(edit.apply("<div>hi</div>").unwrap(), "<div>hello</div>");
    }

    #[test]
    fn test_insert() {
        let edit = TextEdit::insert(4, " className=\"x\"");
        assert_eq!(edit.apply("<div>").unwrap(), "<div className=\"x\">");
    }

    #[test]
    fn test_invalid_range() {
        let edit = TextEdit::new(5, 20, "replacement", "");
        assert!(matches!(
            edit.apply("hello world"),
            Err(EditError::InvalidByteRange { .. })
        ));

        let inverted = TextEdit::new(10, 5, "replacement", "");
        assert!(matches!(
            inverted.apply("hello world"),
            Err(EditError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn test_before_text_mismatch() {
        let edit = TextEdit::new(0, 5, "HELLO", "howdy");
        assert!(matches!(
            edit.apply("hello world"),
            Err(EditError::BeforeTextMismatch { .. })
        ));
    }

    #[test]
    fn test_char_boundary() {
        let edit = TextEdit::new(1, 2, "x", "");
        assert!(matches!(
            edit.apply("é!"),
            Err(EditError::NotCharBoundary(1))
        ));
    }

    #[test]
    fn test_noop_detection() {
        let edit = TextEdit::new(0, 5, "hello", "hello");
        assert!(edit.is_noop("hello world"));
        assert_eq!(edit.apply("hello world").unwrap(), "hello world");
    }
}
