//! Citations, snippets and absolute character offsets

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::char_len;

/// Default snippet length in characters
pub const SNIPPET_MAX_CHARS: usize = 280;

/// Snippet text with its character offsets inside the chunk text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl Snippet {
    fn empty() -> Self {
        Self {
            text: String::new(),
            start: None,
            end: None,
        }
    }
}

/// Leading whitespace skipped, trailing whitespace trimmed, capped at `max_len` chars
pub fn build_snippet(text: &str, max_len: usize) -> Snippet {
    let chars: Vec<char> = text.chars().collect();

    let Some(start) = chars.iter().position(|c| !c.is_whitespace()) else {
        return Snippet::empty();
    };

    let mut end = chars.len();
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    if end <= start {
        return Snippet::empty();
    }

    let max_end = end.min(start + max_len);
    let mut snippet_end = max_end;
    while snippet_end > start && chars[snippet_end - 1].is_whitespace() {
        snippet_end -= 1;
    }
    if snippet_end <= start {
        snippet_end = max_end;
    }

    Snippet {
        text: chars[start..snippet_end].iter().collect(),
        start: Some(start),
        end: Some(snippet_end),
    }
}

/// Map snippet offsets onto the source document, when the chunk's own offsets are known
pub fn compute_absolute_offsets(
    chunk: &RetrievedChunk,
    start: Option<usize>,
    end: Option<usize>,
) -> (Option<usize>, Option<usize>) {
    let (Some(start), Some(end), Some(char_start)) = (start, end, chunk.char_start) else {
        return (None, None);
    };

    let absolute_start = char_start + start;
    let absolute_end = char_start + end;
    if absolute_end <= absolute_start {
        return (None, None);
    }
    if chunk.char_end.is_some_and(|char_end| absolute_end > char_end) {
        return (None, None);
    }
    if absolute_end > char_start + char_len(&chunk.text) {
        return (None, None);
    }
    (Some(absolute_start), Some(absolute_end))
}

/// A chunk cited by the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub chunk_id: Uuid,
    pub source_id: Uuid,
    pub source_title: Option<String>,
    pub page_start: Option<i64>,
    pub page_end: Option<i64>,
    pub snippet: String,
    pub snippet_start: Option<usize>,
    pub snippet_end: Option<usize>,
    pub absolute_start: Option<usize>,
    pub absolute_end: Option<usize>,
}

impl Citation {
    pub fn from_chunk(chunk: &RetrievedChunk) -> Self {
        let snippet = build_snippet(&chunk.text, SNIPPET_MAX_CHARS);
        let (absolute_start, absolute_end) =
            compute_absolute_offsets(chunk, snippet.start, snippet.end);

        Self {
            chunk_id: chunk.chunk_id,
            source_id: chunk.source_id,
            source_title: chunk.source_title.clone(),
            page_start: chunk.page_start,
            page_end: chunk.page_end,
            snippet: snippet.text,
            snippet_start: snippet.start,
            snippet_end: snippet.end,
            absolute_start,
            absolute_end,
        }
    }
}

/// Citations for cited ids present among `chunks`, in citation order
pub fn build_citations(cited_ids: &[Uuid], chunks: &[RetrievedChunk]) -> Vec<Citation> {
    cited_ids
        .iter()
        .filter_map(|id| chunks.iter().find(|c| c.chunk_id == *id))
        .map(Citation::from_chunk)
        .collect()
}

/// Citations sharing one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationGroup {
    pub source_id: Uuid,
    pub source_title: Option<String>,
    pub citations: Vec<Citation>,
}

/// Group by source id, preserving first-seen source order
pub fn build_citation_groups(citations: &[Citation]) -> Vec<CitationGroup> {
    let mut groups: Vec<CitationGroup> = Vec::new();
    for citation in citations {
        match groups.iter_mut().find(|g| g.source_id == citation.source_id) {
            Some(group) => group.citations.push(citation.clone()),
            None => groups.push(CitationGroup {
                source_id: citation.source_id,
                source_title: citation.source_title.clone(),
                citations: vec![citation.clone()],
            }),
        }
    }
    groups
}
