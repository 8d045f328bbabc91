use serde::{Deserialize, Serialize};

/// A highlight range representing a match in the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightRange {
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte offset of the match end (exclusive).
    pub end: usize,
}

/// Non-overlapping, case-insensitive occurrences of `query` in `text`, left to
/// right. Offsets always fall on char boundaries of the original `text`.
pub fn find_highlights(text: &str, query: &str) -> Vec<HighlightRange> {
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let mut ranges = Vec::new();
    if needle.is_empty() {
        return ranges;
    }

    let mut start = 0;
    while start < text.len() {
        match match_len(&text[start..], &needle) {
            Some(len) => {
                ranges.push(HighlightRange {
                    start,
                    end: start + len,
                });
                start += len;
            }
            None => {
                start += text[start..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    ranges
}

// Byte length of the prefix of `haystack` equal to `needle` once lowercased.
fn match_len(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, c) in haystack.char_indices() {
        for lc in c.to_lowercase() {
            if matched == needle.len() || needle[matched] != lc {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(offset + c.len_utf8());
        }
    }
    None
}
