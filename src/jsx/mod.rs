//! tree-sitter integration for locating JSX elements in TSX/JSX sources.

pub mod errors;
pub mod index;
pub mod lang;
pub mod parser;

pub use errors::TreeSitterError;
pub use index::{ElementIndex, JsxElement};
pub use lang::tsx;
pub use parser::{ErrorNode, JsxParser, ParsedSource};
