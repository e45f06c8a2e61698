//! Text-content replacement.
//!
//! The target element is resolved first, from the column or by a fuzzy
//! `<tag` search when the column is stale. Then:
//!
//! 1. If `original_value` occurs as text inside that element, only those
//!    occurrences change.
//! 2. Otherwise the element's children are replaced, using the syntax tree
//!    for its exact extent when available and a quote-aware scan otherwise.
//!
//! Only when no element resolves is `original_value` searched for on the
//! anchor line and the lines below it, and then it must occur exactly once.

use super::scan::{
    column_to_byte, find_attrs, first_tag, is_tag_start, pick_nearest, tag_name_at, tag_occurrences,
    AttrScan, LineMap, Pick, TagScanner,
};
use super::{column_target, ElementCache, ReplaceError, ReplaceRequest};
use crate::config::PatcherConfig;
use crate::edit::TextEdit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use tracing::debug;

const KIND: &str = "content";
const INNER_HTML: &str = "dangerouslySetInnerHTML";

static TAG_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

pub(super) fn plan(
    map: &LineMap<'_>,
    line: usize,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
    elements: &ElementCache,
) -> Result<TextEdit, ReplaceError> {
    let original = request.original_value.filter(|v| !v.is_empty());

    let (element_line, col) = match locate_element(map, line, request, config) {
        Ok(found) => found,
        Err(err) if err.is_not_found() => {
            return match original {
                Some(original) => replace_unanchored(map, line, original, request.new_value, config)?
                    .ok_or(err),
                None => Err(err),
            };
        }
        Err(err) => return Err(err),
    };

    let extent = element_extent(map, element_line, col, elements)?;
    if let Some(original) = original {
        if let Some(edit) = replace_in_children(map.source(), &extent, original, request.new_value) {
            return Ok(edit);
        }
        debug!(
            line = element_line + 1,
            tag = extent.tag,
            "original text not inside element, replacing its children"
        );
    }
    Ok(rewrite(map.source(), &extent, request.new_value, config))
}

/// Byte extent of one element in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Extent<'a> {
    tag: &'a str,
    open: Range<usize>,
    /// `None` when self-closing
    close: Option<Range<usize>>,
}

fn element_extent<'a>(
    map: &LineMap<'a>,
    line: usize,
    col: usize,
    elements: &ElementCache,
) -> Result<Extent<'a>, ReplaceError> {
    let tag = tag_name_at(map.line(line), col)
        .ok_or_else(|| ReplaceError::not_found(KIND, line + 1, "anchor is not a named tag"))?;
    let start = map.offset(line, col);

    let from_tree = elements
        .get(map.source())
        .and_then(|index| index.element_at(start))
        .filter(|element| element.tag == tag && !element.has_error);
    if let Some(element) = from_tree {
        return Ok(Extent {
            tag,
            open: element.open_tag.clone(),
            close: element.close_tag.clone(),
        });
    }

    debug!(line = line + 1, tag, "no clean syntax node for element, scanning text");
    scan_extent(map.source(), line, start, tag)
}

/// Quote-aware scan for the end of the opening tag, then the first `</tag>`.
fn scan_extent<'a>(source: &str, line: usize, start: usize, tag: &'a str) -> Result<Extent<'a>, ReplaceError> {
    let open_end = TagScanner::default()
        .feed(&source[start..])
        .map(|idx| start + idx + 1)
        .ok_or_else(|| {
            ReplaceError::not_found(KIND, line + 1, format!("opening <{tag}> never ends"))
        })?;

    if source[start..open_end].ends_with("/>") {
        return Ok(Extent {
            tag,
            open: start..open_end,
            close: None,
        });
    }

    let closing = format!("</{tag}>");
    let close_start = source[open_end..]
        .find(&closing)
        .map(|idx| open_end + idx)
        .ok_or_else(|| ReplaceError::not_found(KIND, line + 1, format!("missing {closing}")))?;

    Ok(Extent {
        tag,
        open: start..open_end,
        close: Some(close_start..close_start + closing.len()),
    })
}

/// Replace `original` in the element's children; `None` when it is not there.
fn replace_in_children(source: &str, extent: &Extent<'_>, original: &str, value: &str) -> Option<TextEdit> {
    let close = extent.close.as_ref()?;
    let inner = extent.open.end..close.start;
    let (replaced, count) = replace_outside_tags(&source[inner.clone()], original, value);
    (count > 0).then(|| TextEdit::replace_span(source, inner.start, inner.end, replaced))
}

/// Replace the element's children with `value`.
fn rewrite(source: &str, extent: &Extent<'_>, value: &str, config: &PatcherConfig) -> TextEdit {
    let open = prepare_open_tag(&source[extent.open.clone()], config);
    match &extent.close {
        None => TextEdit::replace_span(
            source,
            extent.open.start,
            extent.open.end,
            expand_self_closing(&open, extent.tag, value),
        ),
        Some(close) => TextEdit::replace_span(
            source,
            extent.open.start,
            close.start,
            format!("{open}{value}"),
        ),
    }
}

/// Text search used when no element could be resolved. The text must occur
/// exactly once between the anchor line and the next line that opens or
/// closes an element.
fn replace_unanchored(
    map: &LineMap<'_>,
    line: usize,
    original: &str,
    value: &str,
    config: &PatcherConfig,
) -> Result<Option<TextEdit>, ReplaceError> {
    let last = (line + config.content_search_lines).min(map.line_count());
    let mut total = 0;
    let mut hit = None;

    for i in line..last {
        let text = map.line(i);
        if i > line && first_tag(text).is_some() {
            break;
        }

        let (replaced, count) = replace_outside_tags(text, original, value);
        if count > 0 {
            total += count;
            hit.get_or_insert((i, replaced));
        }

        if i > line && (text.trim_start().starts_with("</") || text.contains("/>")) {
            break;
        }
    }

    match (total, hit) {
        (1, Some((i, replaced))) => {
            debug!(line = i + 1, "original text matched without an element anchor");
            Ok(Some(TextEdit::replace_span(
                map.source(),
                map.line_start(i),
                map.line_end(i),
                replaced,
            )))
        }
        (0, _) | (_, None) => Ok(None),
        (candidates, Some(_)) => Err(ReplaceError::Ambiguous {
            kind: KIND,
            line: line + 1,
            candidates,
        }),
    }
}

/// Replace every occurrence of `original` that is not inside `<...>` tag
/// text, returning the new text and the number of replacements.
fn replace_outside_tags(text: &str, original: &str, value: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut cursor = 0;

    let mut push_text = |out: &mut String, segment: &str| {
        count += segment.matches(original).count();
        out.push_str(&segment.replace(original, value));
    };

    for tag in TAG_TEXT.find_iter(text) {
        push_text(&mut out, &text[cursor..tag.start()]);
        out.push_str(tag.as_str());
        cursor = tag.end();
    }
    push_text(&mut out, &text[cursor..]);

    (out, count)
}

/// Find the `<` of the target element as (line index, byte column).
fn locate_element(
    map: &LineMap<'_>,
    line: usize,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
) -> Result<(usize, usize), ReplaceError> {
    let text = map.line(line);
    if let Some(col) = column_to_byte(text, request.column_number) {
        if is_tag_start(text, col) {
            return Ok((line, col));
        }
    }

    let tag = request.tag_name.ok_or_else(|| {
        ReplaceError::not_found(
            KIND,
            line + 1,
            "column does not point at a tag and no tag name was given",
        )
    })?;

    let last = (line + config.fuzzy_search_lines).min(map.line_count());
    for i in line..last {
        let candidate = map.line(i);
        let occurrences = tag_occurrences(candidate, tag);
        match pick_nearest(&occurrences, column_target(candidate, request.column_number)) {
            Pick::None => continue,
            Pick::One(col) => {
                debug!(tag, line = i + 1, index = col, "fuzzy match for element");
                return Ok((i, col));
            }
            Pick::Ambiguous(candidates) => {
                return Err(ReplaceError::Ambiguous {
                    kind: KIND,
                    line: i + 1,
                    candidates,
                })
            }
        }
    }

    Err(ReplaceError::not_found(
        KIND,
        line + 1,
        format!("no <{tag}> within {} lines", config.fuzzy_search_lines),
    ))
}

/// `<X a="b" />` → `<X a="b">value</X>`
fn expand_self_closing(open: &str, tag: &str, value: &str) -> String {
    let body = open.strip_suffix("/>").unwrap_or(open).trim_end();
    format!("{body}>{value}</{tag}>")
}

/// Drop `dangerouslySetInnerHTML` from an opening tag, since its children
/// are about to be replaced by literal text.
fn prepare_open_tag<'a>(open: &'a str, config: &PatcherConfig) -> Cow<'a, str> {
    if !config.strip_inner_html || !open.contains(INNER_HTML) {
        return Cow::Borrowed(open);
    }

    let mut stripped = open.to_string();
    let spans: Vec<_> = find_attrs(open, INNER_HTML, 0, open.len())
        .into_iter()
        .filter_map(|scan| match scan {
            AttrScan::Found(span) => Some(span.start..span.end),
            AttrScan::Unterminated(_) => None,
        })
        .collect();
    for span in spans.into_iter().rev() {
        stripped.replace_range(span, "");
    }
    let stripped = stripped.replace(INNER_HTML, "");

    let mut tidy = WHITESPACE.replace_all(&stripped, " ").into_owned();
    if tidy.ends_with(" />") || tidy.ends_with(" >") {
        let space = tidy.rfind(' ').unwrap_or_default();
        tidy.remove(space);
    }
    Cow::Owned(tidy)
}
