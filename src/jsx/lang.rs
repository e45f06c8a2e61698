//! TSX language support via ast-grep-language.
//!
//! ast-grep-language bundles the tree-sitter TypeScript grammars, so we take
//! the TSX grammar from there instead of depending on the grammar crate
//! directly. TSX is a superset of the JSX we patch.

use ast_grep_language::{LanguageExt, SupportLang};

/// The language used for every parse in this crate.
pub fn tsx() -> SupportLang {
    SupportLang::Tsx
}

/// The raw tree-sitter grammar for [`tsx`].
pub fn tsx_grammar() -> tree_sitter::Language {
    tsx().get_ts_language()
}
