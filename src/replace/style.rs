//! `className` replacement.

use super::scan::{find_attrs, first_tag, tag_name_at, AttrScan, LineMap};
use super::{attr_in_open_tag, line_anchor, replace_attr, AttrLookup, LineAnchor, ReplaceError, ReplaceRequest};
use crate::config::PatcherConfig;
use crate::edit::TextEdit;
use tracing::debug;

const KIND: &str = "style";
const CLASS_NAME: &str = "className";

pub(super) fn plan(
    map: &LineMap<'_>,
    line: usize,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
) -> Result<TextEdit, ReplaceError> {
    let text = map.line(line);

    match line_anchor(text, request) {
        LineAnchor::Element(start) => in_element(map, line, start, request.new_value, config),
        LineAnchor::LineStart => unanchored(map, line, request.new_value, config),
    }
}

fn in_element(
    map: &LineMap<'_>,
    line: usize,
    start: usize,
    value: &str,
    config: &PatcherConfig,
) -> Result<TextEdit, ReplaceError> {
    match attr_in_open_tag(map, KIND, line, start, CLASS_NAME, config.style_search_lines)? {
        AttrLookup::Found { line, span } => Ok(replace_attr(map, line, span, CLASS_NAME, value)),
        AttrLookup::TagClosed | AttrLookup::WindowExhausted => insert_class_name(map, line, start, value),
    }
}

/// No column or tag anchor: the anchor line must hold at most one
/// `className`, otherwise we cannot tell which element was edited.
fn unanchored(
    map: &LineMap<'_>,
    line: usize,
    value: &str,
    config: &PatcherConfig,
) -> Result<TextEdit, ReplaceError> {
    let text = map.line(line);

    match find_attrs(text, CLASS_NAME, 0, text.len()).as_slice() {
        [] => {}
        [AttrScan::Found(span)] => return Ok(replace_attr(map, line, *span, CLASS_NAME, value)),
        [AttrScan::Unterminated(_)] => {
            return Err(ReplaceError::not_found(
                KIND,
                line + 1,
                "className value continues past the line",
            ))
        }
        many => {
            return Err(ReplaceError::Ambiguous {
                kind: KIND,
                line: line + 1,
                candidates: many.len(),
            })
        }
    }

    if let Some((start, _)) = first_tag(text) {
        return in_element(map, line, start, value, config);
    }

    // The anchor line holds no tag at all (e.g. a source map pointing into an
    // attribute list): look ahead until the opening tag visibly ends.
    let last = (line + config.style_search_lines).min(map.line_count());
    for i in line + 1..last {
        let candidate = map.line(i);
        if let Some(first) = find_attrs(candidate, CLASS_NAME, 0, candidate.len()).into_iter().next() {
            return match first {
                AttrScan::Found(span) => {
                    debug!(line = i + 1, "className found below anchor line");
                    Ok(replace_attr(map, i, span, CLASS_NAME, value))
                }
                AttrScan::Unterminated(_) => Err(ReplaceError::not_found(
                    KIND,
                    i + 1,
                    "className value continues past the line",
                )),
            };
        }

        let trimmed = candidate.trim();
        if trimmed == ">" || trimmed.ends_with("/>") || trimmed.starts_with("</") {
            break;
        }
    }

    Err(ReplaceError::not_found(
        KIND,
        line + 1,
        "no className attribute or tag to attach one to",
    ))
}

fn insert_class_name(
    map: &LineMap<'_>,
    line: usize,
    start: usize,
    value: &str,
) -> Result<TextEdit, ReplaceError> {
    let text = map.line(line);
    let name = tag_name_at(text, start)
        .ok_or_else(|| ReplaceError::not_found(KIND, line + 1, "anchor is not a named tag"))?;

    let offset = map.offset(line, start + 1 + name.len());
    debug!(line = line + 1, tag = name, "inserting className");
    Ok(TextEdit::insert(offset, format!(" {CLASS_NAME}=\"{value}\"")))
}
