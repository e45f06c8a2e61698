//! Line and tag scanning helpers shared by the replacement strategies.
//!
//! Lines are the `'\n'`-separated pieces of the source, exactly like a
//! JavaScript `split('\n')`: a trailing `'\r'` stays part of its line, and a
//! trailing newline produces a final empty line.

use once_cell::sync::Lazy;
use regex::Regex;

/// First element-looking tag on a line: `<Component.Name` or `<tag-name`.
static FIRST_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Z][a-zA-Z0-9.]*|[a-z][a-z0-9-]*)").expect("valid regex"));

/// Byte offsets of line starts in a source text.
pub(crate) struct LineMap<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineMap<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { source, starts }
    }

    pub(crate) fn source(&self) -> &'a str {
        self.source
    }

    pub(crate) fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub(crate) fn line_start(&self, line: usize) -> usize {
        self.starts[line]
    }

    /// Byte offset just past the last character of `line`, excluding `'\n'`.
    pub(crate) fn line_end(&self, line: usize) -> usize {
        match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        }
    }

    pub(crate) fn line(&self, line: usize) -> &'a str {
        &self.source[self.line_start(line)..self.line_end(line)]
    }

    /// Absolute offset of byte `col` within `line`.
    pub(crate) fn offset(&self, line: usize, col: usize) -> usize {
        self.line_start(line) + col
    }
}

/// Byte index of a 1-based character column, or `None` for column 0 or past
/// the end of the line.
pub(crate) fn column_to_byte(line: &str, column: usize) -> Option<usize> {
    let index = column.checked_sub(1)?;
    line.char_indices().nth(index).map(|(byte, _)| byte)
}

/// `<` that opens a tag (not a closing `</`).
pub(crate) fn is_tag_start(line: &str, idx: usize) -> bool {
    let rest = match line.get(idx..) {
        Some(rest) => rest,
        None => return false,
    };
    rest.starts_with('<') && !rest[1..].starts_with('/')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':' | '$')
}

/// Tag name following the `<` at `idx`.
pub(crate) fn tag_name_at(line: &str, idx: usize) -> Option<&str> {
    let rest = line.get(idx..)?.strip_prefix('<')?;
    let len = rest
        .char_indices()
        .find(|&(_, c)| !is_name_char(c))
        .map_or(rest.len(), |(i, _)| i);
    (len > 0).then(|| &rest[..len])
}

/// Offsets of `<tag` on a line, where the name is followed by whitespace,
/// `>`, `/`, or the end of the line.
pub(crate) fn tag_occurrences(line: &str, tag: &str) -> Vec<usize> {
    let needle = format!("<{tag}");
    line.match_indices(&needle)
        .filter(|(idx, _)| {
            match line[idx + needle.len()..].chars().next() {
                None => true,
                Some(c) => c.is_whitespace() || c == '>' || c == '/',
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// First element-looking tag on a line, as (offset of `<`, name).
pub(crate) fn first_tag(line: &str) -> Option<(usize, &str)> {
    let caps = FIRST_TAG.captures(line)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?;
    Some((whole.start(), name.as_str()))
}

/// Outcome of choosing among several candidate offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pick {
    One(usize),
    Ambiguous(usize),
    None,
}

/// Pick the candidate closest to `target`; with no target, only a single
/// candidate is acceptable.
pub(crate) fn pick_nearest(candidates: &[usize], target: Option<usize>) -> Pick {
    match (candidates, target) {
        ([], _) => Pick::None,
        ([only], _) => Pick::One(*only),
        (many, None) => Pick::Ambiguous(many.len()),
        (many, Some(target)) => {
            let mut ranked: Vec<(usize, usize)> = many
                .iter()
                .map(|&c| (c.abs_diff(target), c))
                .collect();
            ranked.sort();
            if ranked[0].0 == ranked[1].0 {
                Pick::Ambiguous(many.len())
            } else {
                Pick::One(ranked[0].1)
            }
        }
    }
}

/// Tracks quotes and `{}` nesting while looking for the `>` that ends an
/// opening tag. State carries over between [`TagScanner::feed`] calls, so an
/// opening tag can span lines.
#[derive(Debug, Default)]
pub(crate) struct TagScanner {
    quote: Option<char>,
    depth: usize,
}

impl TagScanner {
    /// Feed a chunk; returns the byte index (within `chunk`) of the closing `>`.
    pub(crate) fn feed(&mut self, chunk: &str) -> Option<usize> {
        for (idx, c) in chunk.char_indices() {
            if let Some(q) = self.quote {
                if c == q {
                    self.quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' | '`' => self.quote = Some(c),
                '{' => self.depth += 1,
                '}' => self.depth = self.depth.saturating_sub(1),
                '>' if self.depth == 0 => return Some(idx),
                _ => {}
            }
        }
        None
    }
}

/// An attribute occurrence `name=<value>` on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttrSpan {
    /// Offset of the attribute name
    pub start: usize,
    /// Offset just past the value
    pub end: usize,
    /// Quote character for string values, `None` for `{expression}` values
    pub quote: Option<char>,
}

/// Result of looking for an attribute on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrScan {
    Found(AttrSpan),
    /// The attribute starts here but its value continues past the line
    Unterminated(usize),
}

/// All occurrences of attribute `name` in `line[from..to]`.
pub(crate) fn find_attrs(line: &str, name: &str, from: usize, to: usize) -> Vec<AttrScan> {
    let needle = format!("{name}=");
    let region = match line.get(from..to) {
        Some(region) => region,
        None => return Vec::new(),
    };

    region
        .match_indices(&needle)
        .map(|(idx, _)| from + idx)
        .filter(|&start| {
            line[..start]
                .chars()
                .next_back()
                .map_or(true, |c| c.is_whitespace() || c == '<' || c == '{')
        })
        .map(|start| {
            let value_start = start + needle.len();
            match value_end(line, value_start) {
                Some((end, quote)) => AttrScan::Found(AttrSpan { start, end, quote }),
                None => AttrScan::Unterminated(start),
            }
        })
        .collect()
}

fn value_end(line: &str, value_start: usize) -> Option<(usize, Option<char>)> {
    let rest = line.get(value_start..)?;
    let first = rest.chars().next()?;
    match first {
        '"' | '\'' => {
            let close = rest[1..].find(first)?;
            Some((value_start + 1 + close + 1, Some(first)))
        }
        '{' => {
            let mut quote = None;
            let mut depth = 0usize;
            for (idx, c) in rest.char_indices() {
                if let Some(q) = quote {
                    if c == q {
                        quote = None;
                    }
                    continue;
                }
                match c {
                    '"' | '\'' | '`' => quote = Some(c),
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some((value_start + idx + 1, None));
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}
