//! Patcher configuration, read from an optional TOML file.

pub mod schema;

pub use schema::{ConfigError, PatcherConfig};
