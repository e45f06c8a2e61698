//! Single named attribute replacement.

use super::scan::{find_attrs, AttrScan, LineMap};
use super::{attr_in_open_tag, line_anchor, replace_attr, AttrLookup, LineAnchor, ReplaceError, ReplaceRequest};
use crate::config::PatcherConfig;
use crate::edit::TextEdit;

const KIND: &str = "attribute";

pub(super) fn plan(
    map: &LineMap<'_>,
    line: usize,
    name: &str,
    request: &ReplaceRequest<'_>,
    config: &PatcherConfig,
) -> Result<TextEdit, ReplaceError> {
    if name.trim().is_empty() {
        return Err(ReplaceError::InvalidRequest(
            "attribute change without an attribute name".to_string(),
        ));
    }

    let text = map.line(line);
    match line_anchor(text, request) {
        LineAnchor::Element(start) => {
            match attr_in_open_tag(map, KIND, line, start, name, config.style_search_lines)? {
                AttrLookup::Found { line, span } => Ok(replace_attr(map, line, span, name, request.new_value)),
                AttrLookup::TagClosed | AttrLookup::WindowExhausted => Err(ReplaceError::not_found(
                    KIND,
                    line + 1,
                    format!("element has no '{name}' attribute"),
                )),
            }
        }
        LineAnchor::LineStart => match find_attrs(text, name, 0, text.len()).as_slice() {
            [AttrScan::Found(span)] => Ok(replace_attr(map, line, *span, name, request.new_value)),
            [] | [AttrScan::Unterminated(_)] => Err(ReplaceError::not_found(
                KIND,
                line + 1,
                format!("no single-line '{name}' attribute"),
            )),
            many => Err(ReplaceError::Ambiguous {
                kind: KIND,
                line: line + 1,
                candidates: many.len(),
            }),
        },
    }
}
