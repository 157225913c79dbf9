//! Merging of vector and lexical candidate streams

use std::collections::HashMap;
use uuid::Uuid;

use super::{LexicalMatch, RetrievedChunk, VectorMatch};

/// Merge both streams into unique chunks sorted by descending score.
///
/// Vector rows score `1 - distance`, lexical rows score their raw rank. A chunk
/// present in both keeps the larger value. The two scales are not normalised
/// against each other. Equal scores keep insertion order (vector rows first).
pub fn fuse_candidates(vector: Vec<VectorMatch>, lexical: Vec<LexicalMatch>) -> Vec<RetrievedChunk> {
    let mut order: Vec<RetrievedChunk> = Vec::with_capacity(vector.len() + lexical.len());
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    let scored = vector
        .into_iter()
        .map(|row| (row.chunk, 1.0 - row.distance))
        .chain(lexical.into_iter().map(|row| (row.chunk, row.rank)));

    for (mut chunk, score) in scored {
        match index.get(&chunk.chunk_id) {
            Some(&pos) => {
                let existing = &mut order[pos];
                if score > existing.score {
                    existing.score = score;
                }
            }
            None => {
                chunk.score = score;
                index.insert(chunk.chunk_id, order.len());
                order.push(chunk);
            }
        }
    }

    sort_by_score_desc(&mut order);
    order
}

/// Stable descending sort on `score`
pub fn sort_by_score_desc(chunks: &mut [RetrievedChunk]) {
    chunks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}
