use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    /// Byte offset of the match in the lower-cased content.
    pub position: usize,
    /// Lower-cased window around the match with the term highlighted.
    pub context: String,
}

pub fn highlight(term: &str) -> String {
    format!("[MATCH: {}]", term)
}

/// Case-insensitive, non-overlapping, leftmost-first search.
///
/// The highlight is applied to the lower-cased window, so the snippet is
/// entirely lower-case except the original-case term inside the tag.
pub fn find_matches(content: &str, term: &str, context_chars: usize) -> Vec<TextMatch> {
    if content.is_empty() || term.is_empty() {
        return Vec::new();
    }

    let data = content.to_lowercase();
    let needle = term.to_lowercase();
    let tag = highlight(term);

    find_all_str(&data, &needle)
        .into_iter()
        .map(|pos| TextMatch {
            position: pos,
            context: window(&data, pos, needle.len(), context_chars).replace(&needle, &tag),
        })
        .collect()
}

/// `context_chars` bytes either side of `data[pos..pos + len]`, clamped to
/// the string and widened to char boundaries.
pub fn window(data: &str, pos: usize, len: usize, context_chars: usize) -> &str {
    let start = floor_char_boundary(data, pos.saturating_sub(context_chars));
    let end = ceil_char_boundary(data, pos + len + context_chars);
    &data[start..end]
}

/// Byte offsets of all non-overlapping occurrences of `needle`.
pub fn find_all_str(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let pos = from + offset;
        positions.push(pos);
        from = pos + needle.len();
    }
    positions
}

/// Same as [`find_all_str`] over raw bytes.
pub fn find_all_bytes(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut pos = 0;
    while pos + needle.len() <= haystack.len() {
        if &haystack[pos..pos + needle.len()] == needle {
            positions.push(pos);
            pos += needle.len();
        } else {
            pos += 1;
        }
    }
    positions
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// UTF-8 decoding that drops invalid bytes instead of substituting them.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
