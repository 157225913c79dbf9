//! Maximal marginal relevance (MMR) reordering of the top candidates

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::RetrievedChunk;
use crate::domain::text::token_set;

fn default_lambda() -> f64 {
    0.7
}

/// Diversity selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Number of top candidates to reorder; zero disables selection
    #[serde(default)]
    pub window: usize,
    /// Relevance weight; clamped to [0, 1] when applied
    #[serde(default = "default_lambda")]
    pub lambda: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window: 0,
            lambda: default_lambda(),
        }
    }
}

impl DiversityConfig {
    pub fn enabled(window: usize, lambda: f64) -> Self {
        Self {
            enabled: true,
            window,
            lambda,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.window > 0
    }
}

/// Reorder the first `window` chunks by MMR, appending the rest untouched
pub fn apply_diversity(chunks: Vec<RetrievedChunk>, config: &DiversityConfig) -> Vec<RetrievedChunk> {
    if !config.is_active() || chunks.len() < 2 {
        return chunks;
    }

    let lambda = if config.lambda.is_nan() {
        default_lambda()
    } else {
        config.lambda.clamp(0.0, 1.0)
    };

    let mut window = chunks;
    let remainder = if window.len() > config.window {
        window.split_off(config.window)
    } else {
        Vec::new()
    };

    let relevance = normalized_scores(&window);
    let tokens: Vec<HashSet<String>> = window.iter().map(|c| token_set(&c.text)).collect();

    let mut selected: Vec<usize> = Vec::with_capacity(window.len());
    let mut remaining: Vec<usize> = (0..window.len()).collect();

    while !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_value = f64::NEG_INFINITY;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let value = if selected.is_empty() {
                relevance[candidate]
            } else {
                let redundancy = selected
                    .iter()
                    .map(|&chosen| jaccard(&tokens[candidate], &tokens[chosen]))
                    .fold(0.0, f64::max);
                lambda * relevance[candidate] - (1.0 - lambda) * redundancy
            };
            if value > best_value {
                best_value = value;
                best_pos = pos;
            }
        }

        selected.push(remaining.remove(best_pos));
    }

    let mut slots: Vec<Option<RetrievedChunk>> = window.into_iter().map(Some).collect();
    let mut ordered: Vec<RetrievedChunk> = selected
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect();
    ordered.extend(remainder);
    ordered
}

/// Min-max normalisation; all 1.0 when every score is equal
fn normalized_scores(chunks: &[RetrievedChunk]) -> Vec<f64> {
    let min = chunks.iter().map(|c| c.score).fold(f64::INFINITY, f64::min);
    let max = chunks.iter().map(|c| c.score).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    if !span.is_finite() || span <= 0.0 {
        return vec![1.0; chunks.len()];
    }
    chunks.iter().map(|c| (c.score - min) / span).collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(text: &str, score: f64) -> RetrievedChunk {
        RetrievedChunk::new(Uuid::new_v4(), Uuid::new_v4(), text).with_score(score)
    }

    fn texts(chunks: &[RetrievedChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_disabled_is_identity() {
        let input = vec![chunk("a b", 0.9), chunk("a b", 0.8)];
        let output = apply_diversity(input.clone(), &DiversityConfig::default());
        assert_eq!(output, input);

        let zero_window = DiversityConfig::enabled(0, 0.7);
        assert_eq!(apply_diversity(input.clone(), &zero_window), input);
    }

    #[test]
    fn test_redundant_chunk_is_pushed_down() {
        let input = vec![
            chunk("late fee is 25 dollars per month", 0.9),
            chunk("late fee is 25 dollars per month", 0.85),
            chunk("refunds are processed within ten days", 0.8),
        ];
        let output = apply_diversity(input, &DiversityConfig::enabled(3, 0.5));

        assert_eq!(
            texts(&output),
            vec![
                "late fee is 25 dollars per month",
                "refunds are processed within ten days",
                "late fee is 25 dollars per month",
            ]
        );
    }

    #[test]
    fn test_lambda_one_keeps_relevance_order() {
        let input = vec![chunk("x y", 0.9), chunk("x y", 0.5), chunk("z", 0.1)];
        let output = apply_diversity(input.clone(), &DiversityConfig::enabled(3, 4.0));
        assert_eq!(output, input);
    }

    #[test]
    fn test_remainder_untouched_and_ties_first_seen() {
        let input = vec![
            chunk("alpha", 0.5),
            chunk("beta", 0.5),
            chunk("gamma", 0.4),
            chunk("delta", 0.3),
        ];
        let output = apply_diversity(input, &DiversityConfig::enabled(2, 0.7));
        assert_eq!(texts(&output), vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn test_output_is_permutation() {
        let input: Vec<RetrievedChunk> = (0..6)
            .map(|i| chunk(&format!("token{} shared", i % 2), 1.0 - i as f64 * 0.1))
            .collect();
        let output = apply_diversity(input.clone(), &DiversityConfig::enabled(4, 0.3));

        assert_eq!(output.len(), input.len());
        let mut in_ids: Vec<Uuid> = input.iter().map(|c| c.chunk_id).collect();
        let mut out_ids: Vec<Uuid> = output.iter().map(|c| c.chunk_id).collect();
        assert_eq!(&out_ids[4..], &in_ids[4..]);
        in_ids.sort();
        out_ids.sort();
        assert_eq!(in_ids, out_ids);
    }
}
