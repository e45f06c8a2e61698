use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeSitterError {
    #[error("failed to set TSX language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,
}
