//! Index of JSX elements keyed by the byte offset of their opening `<`.
//!
//! The line-based strategies in [`crate::replace`] resolve an element start
//! from a line/column anchor; the index then supplies the exact extent of
//! that element (opening tag, closing tag) from the syntax tree. Elements
//! that sit inside an ERROR region are kept but flagged, and callers fall
//! back to line scanning for them.

use crate::jsx::errors::TreeSitterError;
use crate::pool;
use std::ops::Range;

const ELEMENT: &str = "jsx_element";
const SELF_CLOSING: &str = "jsx_self_closing_element";

/// A located JSX element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxElement {
    /// Tag name as written, e.g. `div` or `Card.Header`
    pub tag: String,
    /// Opening tag, `<` through `>` (or `/>` when self-closing)
    pub open_tag: Range<usize>,
    /// Closing tag, `</` through `>`; `None` when self-closing
    pub close_tag: Option<Range<usize>>,
    /// The element or one of its descendants contains a parse error
    pub has_error: bool,
}

impl JsxElement {
    pub fn start(&self) -> usize {
        self.open_tag.start
    }

    pub fn is_self_closing(&self) -> bool {
        self.close_tag.is_none()
    }

    /// Byte range between the opening and closing tags.
    pub fn inner(&self) -> Option<Range<usize>> {
        self.close_tag
            .as_ref()
            .map(|close| self.open_tag.end..close.start)
    }
}

/// All JSX elements of one source text, sorted by start offset.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    elements: Vec<JsxElement>,
}

impl ElementIndex {
    /// Parse `source` with the pooled TSX parser and index its elements.
    pub fn build(source: &str) -> Result<Self, TreeSitterError> {
        pool::with_parser(|parser| {
            let parsed = parser.parse_with_source(source)?;
            let mut elements = Vec::new();
            collect_elements(parsed.root_node(), source, &mut elements);
            elements.sort_by_key(|e| e.open_tag.start);
            Ok(Self { elements })
        })?
    }

    /// The element whose opening `<` is at `offset`.
    pub fn element_at(&self, offset: usize) -> Option<&JsxElement> {
        self.elements
            .binary_search_by_key(&offset, |e| e.open_tag.start)
            .ok()
            .map(|idx| &self.elements[idx])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsxElement> {
        self.elements.iter()
    }
}

fn collect_elements(node: tree_sitter::Node<'_>, source: &str, out: &mut Vec<JsxElement>) {
    match node.kind() {
        ELEMENT => {
            if let Some(element) = element_from_pair(node, source) {
                out.push(element);
            }
        }
        SELF_CLOSING => {
            if let Some(name) = node.child_by_field_name("name") {
                out.push(JsxElement {
                    tag: source[name.byte_range()].to_string(),
                    open_tag: node.byte_range(),
                    close_tag: None,
                    has_error: node.has_error(),
                });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_elements(child, source, out);
    }
}

fn element_from_pair(node: tree_sitter::Node<'_>, source: &str) -> Option<JsxElement> {
    let open = node.child_by_field_name("open_tag")?;
    let close = node.child_by_field_name("close_tag")?;
    // Fragments (`<>...</>`) have no name and are never design targets.
    let name = open.child_by_field_name("name")?;

    Some(JsxElement {
        tag: source[name.byte_range()].to_string(),
        open_tag: open.byte_range(),
        close_tag: Some(close.byte_range()),
        has_error: node.has_error() || close.is_missing() || close.byte_range().is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = r#"export function App() {
  return (
    <section className="wrap">
      <Card.Header title="x" />
      <p>
        Hello <b>world</b>
      </p>
    </section>
  );
}
"#;

    #[test]
    fn indexes_nested_elements() {
        let index = ElementIndex::build(APP).unwrap();
        let tags: Vec<_> = index.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["section", "Card.Header", "p", "b"]);
    }

    #[test]
    fn element_at_exact_offset() {
        let index = ElementIndex::build(APP).unwrap();
        let p_start = APP.find("<p>").unwrap();
        let p = index.element_at(p_start).unwrap();

        assert_eq!(p.tag, "p");
        assert!(!p.is_self_closing());
        assert!(!p.has_error);
        let inner = p.inner().unwrap();
        assert!(APP[inner].contains("Hello <b>world</b>"));

        assert!(index.element_at(p_start + 1).is_none());
    }

    #[test]
    fn self_closing_element() {
        let index = ElementIndex::build(APP).unwrap();
        let start = APP.find("<Card.Header").unwrap();
        let card = index.element_at(start).unwrap();

        assert!(card.is_self_closing());
        assert_eq!(&APP[card.open_tag.clone()], "<Card.Header title=\"x\" />");
        assert!(card.inner().is_none());
    }
}
