use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplaceError {
    #[error("line numbers are 1-based, got 0")]
    InvalidPosition,

    #[error("line {line} exceeds file length ({line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("{kind} target not found near line {line}: {detail}")]
    NotFound {
        kind: &'static str,
        line: usize,
        detail: String,
    },

    #[error("{kind} target near line {line} is ambiguous ({candidates} candidates)")]
    Ambiguous {
        kind: &'static str,
        line: usize,
        candidates: usize,
    },

    #[error("invalid replace request: {0}")]
    InvalidRequest(String),

    #[error("replacement at line {line} introduces parse errors ({before} -> {after})")]
    SyntaxRegression {
        line: usize,
        before: usize,
        after: usize,
    },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

impl ReplaceError {
    pub(crate) fn not_found(kind: &'static str, line: usize, detail: impl Into<String>) -> Self {
        ReplaceError::NotFound {
            kind,
            line,
            detail: detail.into(),
        }
    }

    /// Whether the target could not be located at all.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReplaceError::NotFound { .. } | ReplaceError::LineOutOfRange { .. }
        )
    }
}
