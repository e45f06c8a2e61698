//! The per-change replacement primitive.
//!
//! [`smart_replace_in_source`] rewrites one element of a JSX/TSX source,
//! given the 1-based line/column the element was rendered from. The column
//! is the primary anchor; the tag name is used to disambiguate or to find
//! the element again when the column is stale. When neither gives a single
//! confident target, the request fails with [`ReplaceError::NotFound`] or
//! [`ReplaceError::Ambiguous`] instead of touching some other node.
//!
//! Each strategy only computes a [`TextEdit`]; application is shared.

mod attribute;
mod content;
pub mod errors;
pub(crate) mod scan;
mod style;

pub use errors::ReplaceError;

use crate::change::{ChangeKind, PendingChange};
use crate::config::PatcherConfig;
use crate::edit::TextEdit;
use crate::jsx::ElementIndex;
use once_cell::unsync::OnceCell;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;
use scan::{
    column_to_byte, find_attrs, is_tag_start, pick_nearest, tag_occurrences, AttrScan, AttrSpan,
    LineMap, Pick, TagScanner,
};

/// Arguments of a single replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceRequest<'a> {
    /// 1-based
    pub line_number: usize,
    /// 1-based character column; 0 when unknown
    pub column_number: usize,
    pub new_value: &'a str,
    pub original_value: Option<&'a str>,
    pub kind: &'a ChangeKind,
    pub tag_name: Option<&'a str>,
}

impl<'a> From<&'a PendingChange> for ReplaceRequest<'a> {
    fn from(change: &'a PendingChange) -> Self {
        let tag = change.source_info.element_type.as_str();
        Self {
            line_number: change.source_info.line_number,
            column_number: change.source_info.column_number,
            new_value: &change.new_value,
            original_value: change.original_value.as_deref(),
            kind: &change.kind,
            tag_name: (!tag.is_empty()).then_some(tag),
        }
    }
}

/// Element index of one source text, built on first use.
///
/// The index answers only for the text it was built from; after that text
/// changes, [`ElementCache::invalidate`] it. A lookup with different text
/// returns `None` and the strategies fall back to scanning.
#[derive(Debug, Default)]
pub struct ElementCache {
    index: OnceCell<(u64, Option<ElementIndex>)>,
}

impl ElementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<&ElementIndex> {
        let key = xxh3_64(source.as_bytes());
        let (built_for, index) = self.index.get_or_init(|| {
            let index = match ElementIndex::build(source) {
                Ok(index) => Some(index),
                Err(err) => {
                    debug!(error = %err, "element index unavailable");
                    None
                }
            };
            (key, index)
        });

        if *built_for != key {
            debug!("element index was built for other text");
            return None;
        }
        index.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.index = OnceCell::new();
    }
}

/// Compute the edit for one request without applying it.
pub fn plan_replacement(
    content: &str,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
) -> Result<TextEdit, ReplaceError> {
    plan_replacement_cached(content, request, config, &ElementCache::new())
}

/// [`plan_replacement`] reusing an element index across requests on the
/// same text.
pub fn plan_replacement_cached(
    content: &str,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
    elements: &ElementCache,
) -> Result<TextEdit, ReplaceError> {
    let map = LineMap::new(content);
    let line = request
        .line_number
        .checked_sub(1)
        .ok_or(ReplaceError::InvalidPosition)?;

    if line >= map.line_count() {
        return Err(ReplaceError::LineOutOfRange {
            line: request.line_number,
            line_count: map.line_count(),
        });
    }

    match request.kind {
        ChangeKind::Style => style::plan(&map, line, request, config),
        ChangeKind::Content => content::plan(&map, line, request, config, elements),
        ChangeKind::Attribute { attribute_name } => {
            attribute::plan(&map, line, attribute_name, request, config)
        }
    }
}

/// Apply one request to `content`, returning the new text.
pub fn smart_replace_in_source(
    content: &str,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
) -> Result<String, ReplaceError> {
    let edit = plan_replacement(content, request, config)?;
    Ok(edit.apply(content)?)
}

/// Where on the anchor line an attribute search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAnchor {
    /// Byte offset of the target element's `<`
    Element(usize),
    /// No confident element; scan the whole line
    LineStart,
}

/// Approximate byte target for a column, clamped to the line.
fn column_target(line: &str, column: usize) -> Option<usize> {
    if column == 0 {
        return None;
    }
    Some(column_to_byte(line, column).unwrap_or(line.len()))
}

fn line_anchor(line: &str, request: &ReplaceRequest<'_>) -> LineAnchor {
    if let Some(col) = column_to_byte(line, request.column_number) {
        if is_tag_start(line, col) {
            return LineAnchor::Element(col);
        }
    }

    if let Some(tag) = request.tag_name {
        let occurrences = tag_occurrences(line, tag);
        if let Pick::One(at) = pick_nearest(&occurrences, column_target(line, request.column_number)) {
            return LineAnchor::Element(at);
        }
    }

    LineAnchor::LineStart
}

/// Result of searching an element's opening tag for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrLookup {
    Found { line: usize, span: AttrSpan },
    /// The opening tag ended without the attribute
    TagClosed,
    /// The search window ran out before the tag ended
    WindowExhausted,
}

/// Look for `name=` inside the opening tag starting at `start` on `line`,
/// following the tag across at most `window` lines.
fn attr_in_open_tag(
    map: &LineMap<'_>,
    kind: &'static str,
    line: usize,
    start: usize,
    name: &str,
    window: usize,
) -> Result<AttrLookup, ReplaceError> {
    let mut scanner = TagScanner::default();
    let last = (line + window).min(map.line_count());

    for i in line..last {
        let text = map.line(i);
        let from = if i == line { start } else { 0 };
        let close = scanner.feed(&text[from..]).map(|end| from + end);
        let to = close.unwrap_or(text.len());

        if let Some(first) = find_attrs(text, name, from, to).into_iter().next() {
            return match first {
                AttrScan::Found(span) => Ok(AttrLookup::Found { line: i, span }),
                AttrScan::Unterminated(_) => Err(ReplaceError::not_found(
                    kind,
                    i + 1,
                    format!("value of '{name}' continues past the line"),
                )),
            };
        }

        if close.is_some() {
            return Ok(AttrLookup::TagClosed);
        }
    }

    Ok(AttrLookup::WindowExhausted)
}

/// Edit replacing the attribute at `span` on `line`, keeping its quote
/// style. Expression values become double-quoted strings.
fn replace_attr(map: &LineMap<'_>, line: usize, span: AttrSpan, name: &str, value: &str) -> TextEdit {
    let rendered = match span.quote {
        Some(q) => format!("{name}={q}{value}{q}"),
        None => format!("{name}=\"{value}\""),
    };
    TextEdit::replace_span(
        map.source(),
        map.offset(line, span.start),
        map.offset(line, span.end),
        rendered,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(kind: &'a ChangeKind, line: usize, column: usize, value: &'a str) -> ReplaceRequest<'a> {
        ReplaceRequest {
            line_number: line,
            column_number: column,
            new_value: value,
            original_value: None,
            kind,
            tag_name: None,
        }
    }

    #[test]
    fn rejects_line_zero() {
        let kind = ChangeKind::Content;
        let err = smart_replace_in_source("<p>a</p>", &request(&kind, 0, 1, "b"), &PatcherConfig::default())
            .unwrap_err();
        assert_eq!(err, ReplaceError::InvalidPosition);
    }

    #[test]
    fn rejects_line_past_end() {
        let kind = ChangeKind::Content;
        let err = smart_replace_in_source("<p>a</p>", &request(&kind, 3, 1, "b"), &PatcherConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ReplaceError::LineOutOfRange {
                line: 3,
                line_count: 1
            }
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn request_from_change() {
        let change = PendingChange::content(4, 2, "h1", "Title").with_original("Old");
        let req = ReplaceRequest::from(&change);
        assert_eq!(req.line_number, 4);
        assert_eq!(req.column_number, 2);
        assert_eq!(req.tag_name, Some("h1"));
        assert_eq!(req.original_value, Some("Old"));

        let untagged = PendingChange::content(1, 1, "", "x");
        assert_eq!(ReplaceRequest::from(&untagged).tag_name, None);
    }

    #[test]
    fn element_cache_answers_only_for_its_text() {
        let mut cache = ElementCache::new();
        let first = "const a = <p>x</p>;";
        let second = "const a = <p>y</p>;";

        assert_eq!(cache.get(first).map(|index| index.len()), Some(1));
        assert!(cache.get(second).is_none());

        cache.invalidate();
        assert!(cache.get(second).is_some());
        assert!(cache.get(first).is_none());
    }

    #[test]
    fn anchor_prefers_column_then_tag() {
        let kind = ChangeKind::Style;
        let line = "<a><b><a>";
        let mut req = request(&kind, 1, 4, "x");
        assert_eq!(line_anchor(line, &req), LineAnchor::Element(3));

        req.column_number = 2;
        req.tag_name = Some("b");
        assert_eq!(line_anchor(line, &req), LineAnchor::Element(3));

        req.tag_name = Some("a");
        req.column_number = 0;
        assert_eq!(line_anchor(line, &req), LineAnchor::LineStart);
    }
}
