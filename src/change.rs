//! Pending design changes captured from a live preview.
//!
//! Coordinates always refer to the ORIGINAL file text. Because a single
//! replacement can only change the length of its own line(s), applying
//! changes in strictly decreasing (line, column) order keeps every
//! not-yet-applied coordinate valid.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Where a rendered DOM node came from in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// 1-based line
    pub line_number: usize,
    /// 1-based column (character index); 0 means unknown
    #[serde(default)]
    pub column_number: usize,
    /// Tag name of the element, e.g. `div` or `Card.Header`
    #[serde(default)]
    pub element_type: String,
}

/// What a change rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeKind {
    /// The element's `className`
    Style,
    /// The element's text children
    Content,
    /// A single named attribute
    Attribute {
        #[serde(rename = "attributeName")]
        attribute_name: String,
    },
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Style => "style",
            ChangeKind::Content => "content",
            ChangeKind::Attribute { .. } => "attribute",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Attribute { attribute_name } => write!(f, "attribute({attribute_name})"),
            other => f.write_str(other.label()),
        }
    }
}

/// A user edit that has not been written back to its file yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    #[serde(flatten)]
    pub kind: ChangeKind,
    pub source_info: SourceInfo,
    pub new_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
}

impl PendingChange {
    pub fn new(kind: ChangeKind, source_info: SourceInfo, new_value: impl Into<String>) -> Self {
        Self {
            kind,
            source_info,
            new_value: new_value.into(),
            original_value: None,
        }
    }

    pub fn style(line: usize, column: usize, tag: &str, class_list: impl Into<String>) -> Self {
        Self::new(ChangeKind::Style, SourceInfo::new(line, column, tag), class_list)
    }

    pub fn content(line: usize, column: usize, tag: &str, text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Content, SourceInfo::new(line, column, tag), text)
    }

    pub fn attribute(
        line: usize,
        column: usize,
        tag: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            ChangeKind::Attribute {
                attribute_name: name.into(),
            },
            SourceInfo::new(line, column, tag),
            value,
        )
    }

    /// Set the previous value, used for text matching.
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original_value = Some(original.into());
        self
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition {
            line: self.source_info.line_number,
            column: self.source_info.column_number,
        }
    }
}

impl SourceInfo {
    pub fn new(line_number: usize, column_number: usize, element_type: impl Into<String>) -> Self {
        Self {
            line_number,
            column_number,
            element_type: element_type.into(),
        }
    }
}

/// A (line, column) pair, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl Ord for SourcePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for SourcePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Indices of `changes` in application order: descending (line, column).
///
/// The sort is stable, so changes at the same position keep their
/// collection order.
pub fn application_order(changes: &[PendingChange]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..changes.len()).collect();
    order.sort_by(|&a, &b| changes[b].position().cmp(&changes[a].position()));
    order
}
