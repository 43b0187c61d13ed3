//! Span-based text rewriting.
//!
//! Stages that only touch a handful of nodes locate them on the AST and then
//! splice replacements into the original text. Everything outside the edited
//! spans, formatting and comments included, is preserved.

use oxc_span::Span;

/// Replace `start..end` (byte offsets) with `text`. An empty range inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Edit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            text: text.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            text: text.into(),
        }
    }

    pub fn replace_range(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn remove(start: u32, end: u32) -> Self {
        Self::replace_range(start, end, "")
    }
}

/// Apply `edits` to `code`.
///
/// Edits are applied in source order; insertions at the same offset keep the
/// order they were pushed in. An edit overlapping an earlier one is dropped.
pub(crate) fn apply_edits(code: &str, mut edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return code.to_string();
    }
    edits.sort_by_key(|edit| (edit.start, edit.end));

    let mut out = String::with_capacity(code.len());
    let mut cursor = 0usize;
    for edit in edits {
        let (start, end) = (edit.start as usize, edit.end as usize);
        if start < cursor || end > code.len() {
            continue;
        }
        out.push_str(&code[cursor..start]);
        out.push_str(&edit.text);
        cursor = end;
    }
    out.push_str(&code[cursor..]);
    out
}
