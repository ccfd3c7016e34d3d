//! Span-anchored text edits.
//!
//! The syntax tree is never re-rendered from scratch.  Pruning and
//! renaming are recorded as byte-range replacements against the original
//! source, and printing applies them in one pass.  Everything outside an
//! edit keeps its original bytes, comments and layout included.
use crate::error::TransformError;

/// Replace `source[start..end]` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, String::new())
    }

    /// Whether `other` lies entirely within this edit's range.
    pub fn covers(&self, other: &TextEdit) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Apply `edits` to `source`.
///
/// Edits may arrive in any order.  Two edits touching the same bytes are
/// a bug in whoever produced them and are rejected.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> Result<String, TransformError> {
    edits.sort_by_key(|e| (e.start, e.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        if edit.start < cursor || edit.end < edit.start || edit.end > source.len() {
            return Err(TransformError::OverlappingEdits { offset: edit.start });
        }
        out.push_str(&source[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&source[cursor..]);

    Ok(out)
}

/// Widen a deletion so that a statement sitting alone on its line takes
/// its indentation and line break with it.
///
/// If anything other than whitespace shares the line, the range is
/// returned unchanged.
pub fn expand_to_line(source: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = source.as_bytes();

    let mut line_start = start;
    while line_start > 0 && matches!(bytes[line_start - 1], b' ' | b'\t') {
        line_start -= 1;
    }
    let owns_line_start = line_start == 0 || bytes[line_start - 1] == b'\n';

    let mut line_end = end;
    while line_end < bytes.len() && matches!(bytes[line_end], b' ' | b'\t' | b'\r') {
        line_end += 1;
    }
    let owns_line_end = line_end == bytes.len() || bytes[line_end] == b'\n';

    if !(owns_line_start && owns_line_end) {
        return (start, end);
    }
    if line_end == bytes.len() {
        return (line_start, line_end);
    }
    let line_end = line_end + 1;

    // Between two blank lines, take one of them along so the gap does
    // not double up.
    let blank_before = line_start == 0 || is_blank_line_before(bytes, line_start - 1);
    if blank_before && let Some(next) = blank_line_after(bytes, line_end) {
        return (line_start, next);
    }
    (line_start, line_end)
}

/// Whether the line ending at the newline `newline` is whitespace only.
fn is_blank_line_before(bytes: &[u8], newline: usize) -> bool {
    let mut pos = newline;
    while pos > 0 && matches!(bytes[pos - 1], b' ' | b'\t' | b'\r') {
        pos -= 1;
    }
    pos == 0 || bytes[pos - 1] == b'\n'
}

/// If the line starting at `start` is whitespace only, the offset just
/// past its newline.
fn blank_line_after(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\r') {
        pos += 1;
    }
    (pos < bytes.len() && bytes[pos] == b'\n').then_some(pos + 1)
}
