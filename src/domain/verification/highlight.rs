//! Evidence highlighting seam and the token-window span heuristic

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::Debug;

use super::{Claim, ClaimHighlight, EvidenceHighlight, HighlightSpan};
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::tokens;
use crate::domain::DomainError;

const MAX_HIGHLIGHT_LEN: usize = 240;
const CONTEXT_LEADING: usize = 80;
const CONTEXT_TRAILING: usize = 160;
const SNAP_RANGE: usize = 20;

/// Locates a display span for each (claim, evidence chunk) pair
#[async_trait]
pub trait EvidenceHighlighter: Send + Sync + Debug {
    async fn highlight(
        &self,
        question: &str,
        claims: &[Claim],
        chunks: &[RetrievedChunk],
    ) -> Result<Vec<ClaimHighlight>, DomainError>;

    fn highlighter_name(&self) -> &'static str;
}

/// Window around the longest claim token found in the chunk, snapped to whitespace.
///
/// Offsets are character offsets into `chunk_text`.
pub fn token_window_span(claim_text: &str, chunk_text: &str) -> Option<HighlightSpan> {
    if chunk_text.is_empty() {
        return None;
    }

    let chars: Vec<char> = chunk_text.chars().collect();
    let (token_start, token_end) = best_token_span(claim_text, &chars)?;

    let start = snap_start(&chars, token_start.saturating_sub(CONTEXT_LEADING));
    let mut end = snap_end(&chars, (token_end + CONTEXT_TRAILING).min(chars.len()));

    if end.saturating_sub(start) > MAX_HIGHLIGHT_LEN {
        end = chars.len().min(start + MAX_HIGHLIGHT_LEN);
    }
    if start >= end {
        return None;
    }

    Some(HighlightSpan {
        start,
        end,
        text: chars[start..end].iter().collect(),
    })
}

/// Fallback highlighting for every claim's evidence using [`token_window_span`]
pub fn highlight_with_token_window(claims: &[Claim], chunks: &[RetrievedChunk]) -> Vec<ClaimHighlight> {
    claims
        .iter()
        .map(|claim| {
            let evidence = claim
                .evidence
                .iter()
                .map(|item| {
                    let span = chunks
                        .iter()
                        .find(|c| c.chunk_id == item.chunk_id)
                        .and_then(|chunk| token_window_span(&claim.claim_text, &chunk.text));
                    EvidenceHighlight::unhighlighted(item).with_span(span)
                })
                .collect();
            ClaimHighlight::new(claim, evidence)
        })
        .collect()
}

fn best_token_span(claim_text: &str, chars: &[char]) -> Option<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut unique: Vec<(usize, String)> = tokens(claim_text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .enumerate()
        .collect();
    if unique.is_empty() {
        return None;
    }
    unique.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()).then(a.0.cmp(&b.0)));

    let lowered: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    unique.iter().find_map(|(_, token)| {
        let needle: Vec<char> = token.chars().collect();
        find_chars(&lowered, &needle).map(|idx| (idx, idx + needle.len()))
    })
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn snap_start(chars: &[char], start: usize) -> usize {
    if start == 0 {
        return 0;
    }
    let lower = start.saturating_sub(SNAP_RANGE);
    (lower..=start)
        .rev()
        .find(|&pos| chars[pos].is_whitespace())
        .map(|pos| pos + 1)
        .unwrap_or(start)
}

fn snap_end(chars: &[char], end: usize) -> usize {
    if end >= chars.len() {
        return chars.len();
    }
    let upper = (chars.len() - 1).min(end + SNAP_RANGE);
    (end..=upper)
        .find(|&pos| chars[pos].is_whitespace())
        .unwrap_or(end)
}
