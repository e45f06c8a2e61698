//! Thread-local parser pooling.
//!
//! A patch pass parses the file again after every accepted edit (element
//! lookup and syntax validation). Each thread keeps one TSX parser
//! and reuses it.

use crate::jsx::{JsxParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static JSX_PARSER: RefCell<Option<JsxParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// On first call per thread, creates new parser. Subsequent calls reuse
/// the same parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use design_patcher::pool::with_parser;
///
/// let errors = with_parser(|parser| {
///     parser.parse_with_source("const a = <div />;").map(|p| p.error_count())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut JsxParser) -> R,
{
    JSX_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_mut() {
            Some(parser) => Ok(f(parser)),
            None => {
                let mut parser = JsxParser::new()?;
                let result = f(&mut parser);
                *slot = Some(parser);
                Ok(result)
            }
        }
    })
}
