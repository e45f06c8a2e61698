use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_STYLE_SEARCH_LINES: usize = 15;
pub const DEFAULT_CONTENT_SEARCH_LINES: usize = 20;
pub const DEFAULT_FUZZY_SEARCH_LINES: usize = 300;

/// Tuning knobs for the replacement strategies.
///
/// Every field is optional in the file; missing ones keep their default.
///
/// ```toml
/// style_search_lines = 15
/// content_search_lines = 20
/// fuzzy_search_lines = 300
/// validate_syntax = true
/// strip_inner_html = true
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PatcherConfig {
    /// Lines (including the anchor line) scanned for a `className` attribute
    pub style_search_lines: usize,
    /// Lines scanned for the original text of a content change
    pub content_search_lines: usize,
    /// Lines scanned for `<tag` when the column anchor is stale
    pub fuzzy_search_lines: usize,
    /// Reject replacements that add TSX parse errors
    pub validate_syntax: bool,
    /// Drop `dangerouslySetInnerHTML` when replacing element content
    pub strip_inner_html: bool,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            style_search_lines: DEFAULT_STYLE_SEARCH_LINES,
            content_search_lines: DEFAULT_CONTENT_SEARCH_LINES,
            fuzzy_search_lines: DEFAULT_FUZZY_SEARCH_LINES,
            validate_syntax: true,
            strip_inner_html: true,
        }
    }
}

impl PatcherConfig {
    /// Parse a TOML document.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Self::parse(input, None)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input, Some(path))
    }

    /// Every search window must cover at least the anchor line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_windows(None)
    }

    fn parse(input: &str, file: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = toml_edit::de::from_str(input).map_err(|source| ConfigError::Malformed {
            file: file.map(Path::to_path_buf),
            source,
        })?;
        config.check_windows(file)?;
        Ok(config)
    }

    fn check_windows(&self, file: Option<&Path>) -> Result<(), ConfigError> {
        let empty: Vec<_> = [
            ("style_search_lines", self.style_search_lines),
            ("content_search_lines", self.content_search_lines),
            ("fuzzy_search_lines", self.fuzzy_search_lines),
        ]
        .into_iter()
        .filter(|(_, lines)| *lines == 0)
        .map(|(field, _)| field)
        .collect();

        if empty.is_empty() {
            return Ok(());
        }
        Err(ConfigError::EmptyWindow {
            file: file.map(Path::to_path_buf),
            fields: empty,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read
    Unreadable { path: PathBuf, source: io::Error },
    /// Not TOML, or a value of the wrong type or an unknown key
    Malformed {
        file: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    /// One or more search windows were set to 0 lines
    EmptyWindow {
        file: Option<PathBuf>,
        fields: Vec<&'static str>,
    },
}

impl ConfigError {
    /// The file the error came from, if it was read from disk.
    pub fn file(&self) -> Option<&Path> {
        match self {
            ConfigError::Unreadable { path, .. } => Some(path),
            ConfigError::Malformed { file, .. } | ConfigError::EmptyWindow { file, .. } => {
                file.as_deref()
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = self.file() {
            write!(f, "{}: ", file.display())?;
        }
        match self {
            ConfigError::Unreadable { source, .. } => write!(f, "cannot read patcher config: {source}"),
            ConfigError::Malformed { source, .. } => {
                write!(f, "patcher config is not valid: {}", source.to_string().trim_end())
            }
            ConfigError::EmptyWindow { fields, .. } => write!(
                f,
                "{} set to 0; a search window needs at least the anchor line",
                fields.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Unreadable { source, .. } => Some(source),
            ConfigError::Malformed { source, .. } => Some(source),
            ConfigError::EmptyWindow { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PatcherConfig::default().validate().is_ok());
        assert_eq!(PatcherConfig::from_toml("").unwrap(), PatcherConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PatcherConfig::from_toml("fuzzy_search_lines = 50\nvalidate_syntax = false\n").unwrap();
        assert_eq!(config.fuzzy_search_lines, 50);
        assert!(!config.validate_syntax);
        assert_eq!(config.style_search_lines, DEFAULT_STYLE_SEARCH_LINES);
    }

    #[test]
    fn empty_windows_are_named_together() {
        let err = PatcherConfig::from_toml("style_search_lines = 0\nfuzzy_search_lines = 0").unwrap_err();
        match &err {
            ConfigError::EmptyWindow { fields, file } => {
                assert_eq!(fields, &["style_search_lines", "fuzzy_search_lines"]);
                assert!(file.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "style_search_lines, fuzzy_search_lines set to 0; a search window needs at least the anchor line"
        );
    }

    #[test]
    fn wrong_type_and_unknown_key_are_malformed() {
        let err = PatcherConfig::from_toml("style_search_lines = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));

        let err = PatcherConfig::from_toml("search_lines = 4").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.toml");
        fs::write(&path, "content_search_lines = 0").unwrap();

        let err = PatcherConfig::from_file(&path).unwrap_err();
        assert_eq!(err.file(), Some(path.as_path()));
        assert!(err.to_string().starts_with(&path.display().to_string()));
        assert!(err.to_string().contains("content_search_lines"));

        let missing = PatcherConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Unreadable { .. }));
    }
}
