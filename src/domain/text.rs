//! Text helpers shared by diversity selection, verification and highlighting

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid token regex"));

/// Lowercase alphanumeric tokens in order of appearance (duplicates kept)
pub fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase alphanumeric token set
pub fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

/// Split text after `.`, `!` or `?` when followed by whitespace.
///
/// The whitespace run is consumed; pieces are returned untrimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut piece_start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let punct_end = idx + ch.len_utf8();
        let mut ws_end = punct_end;
        while let Some(&(next_idx, next)) = iter.peek() {
            if !next.is_whitespace() {
                break;
            }
            ws_end = next_idx + next.len_utf8();
            iter.next();
        }
        if ws_end > punct_end {
            parts.push(&text[piece_start..punct_end]);
            piece_start = ws_end;
        }
    }
    parts.push(&text[piece_start..]);
    parts
}

/// Character count (Unicode scalar values)
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice by character offsets, clamped to the text
pub fn char_slice(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

/// Truncate to `limit` characters without any marker
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Trim, then cut to `limit - 3` characters plus `...` when too long
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    let cleaned = text.trim();
    if char_len(cleaned) <= limit {
        return cleaned.to_string();
    }
    let mut out: String = cleaned.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
