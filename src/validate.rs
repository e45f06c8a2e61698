//! Parse validation for patched sources.
//!
//! After a replacement, the file is re-parsed as TSX. If it has more ERROR
//! nodes than before, the replacement is refused and the previous text kept.
//! Sources that were already broken stay patchable as long as an edit does
//! not make them worse.

use crate::jsx::TreeSitterError;
use crate::pool;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("parse error introduced: {before} ERROR nodes before edit, {after} after")]
    ParseErrorIntroduced {
        before: usize,
        after: usize,
        errors: Vec<ErrorLocation>,
    },

    #[error("tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),
}

/// Location of an error node in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-based
    pub line: usize,
    /// 1-based, in bytes
    pub column: usize,
}

/// Count ERROR/MISSING nodes in `source`.
pub fn error_count(source: &str) -> Result<usize, ValidationError> {
    let count = pool::with_parser(|parser| {
        parser
            .parse_with_source(source)
            .map(|parsed| parsed.error_count())
    })??;
    Ok(count)
}

/// Compares error counts before and after an edit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxGuard;

impl SyntaxGuard {
    /// Check that `edited` does not introduce parse errors relative to `original`.
    pub fn check(&self, original: &str, edited: &str) -> Result<(), ValidationError> {
        self.check_against(error_count(original)?, edited).map(|_| ())
    }

    /// Check `edited` against the known error count of the text it was
    /// derived from. Returns the error count of `edited`.
    pub fn check_against(&self, before: usize, edited: &str) -> Result<usize, ValidationError> {
        pool::with_parser(|parser| {
            let parsed = parser.parse_with_source(edited)?;
            let after = parsed.error_count();
            if after <= before {
                return Ok(after);
            }

            let errors = parsed
                .error_nodes()
                .into_iter()
                .map(|node| ErrorLocation {
                    byte_start: node.byte_start,
                    byte_end: node.byte_end,
                    line: node.start_point.row + 1,
                    column: node.start_point.column + 1,
                })
                .collect();

            Err(ValidationError::ParseErrorIntroduced {
                before,
                after,
                errors,
            })
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_clean_edit() {
        let guard = SyntaxGuard;
        let original = "const a = <div className=\"a\">hi</div>;";
        let edited = "const a = <div className=\"b\">hello</div>;";
        assert!(guard.check(original, edited).is_ok());
    }

    #[test]
    fn rejects_broken_edit() {
        let guard = SyntaxGuard;
        let original = "const a = <div className=\"a\">hi</div>;";
        let edited = "const a = <div className=\"b\"c\">hi</div>;";
        let err = guard.check(original, edited).unwrap_err();
        match err {
            ValidationError::ParseErrorIntroduced { before, after, errors } => {
                assert_eq!(before, 0);
                assert!(after > 0);
                assert!(!errors.is_empty());
                assert_eq!(errors[0].line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tolerates_preexisting_errors() {
        let guard = SyntaxGuard;
        let original = "const = (;\nconst a = <p>x</p>;";
        let edited = "const = (;\nconst a = <p>y</p>;";
        assert!(guard.check(original, edited).is_ok());
    }

    #[test]
    fn check_against_reports_new_count() {
        let guard = SyntaxGuard;
        let broken = "const = (;\nconst a = <p>x</p>;";
        let before = error_count(broken).unwrap();
        assert!(before > 0);

        assert_eq!(guard.check_against(before, "const a = <p>x</p>;").unwrap(), 0);
        assert!(matches!(
            guard.check_against(0, broken),
            Err(ValidationError::ParseErrorIntroduced { before: 0, .. })
        ));
    }
}
