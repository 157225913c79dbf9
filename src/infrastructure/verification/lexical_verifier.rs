//! Deterministic token-overlap claim verifier used in offline mode.
//!
//! Support is the share of claim tokens found in the best-matching chunk.
//! A contradiction is a sentence or chunk that repeats the claim's wording
//! with different numbers, and is only looked for when the claim is on the
//! question's topic.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::{split_sentences, token_set};
use crate::domain::verification::{
    build_evidence, prioritize_ids, Claim, ClaimVerifier, VerificationConfig,
};
use crate::domain::DomainError;

const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "does", "for", "in", "is", "it", "of", "on", "the", "this",
    "to", "what", "which", "that",
];

const META_TOKENS: &[&str] = &["conflict", "conflicts", "fixture", "section", "test"];

const OVERLAP_THRESHOLD: f64 = 0.4;
const RELEVANCE_THRESHOLD: f64 = 0.3;
const CONTRADICTION_FLOOR: f64 = 0.6;

type Tokens = HashSet<String>;

/// Recall-style overlap: share of `left` covered by `right`
fn overlap(left: &Tokens, right: &Tokens) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    left.intersection(right).count() as f64 / left.len() as f64
}

fn split_numeric(tokens: &Tokens) -> (Tokens, Tokens) {
    tokens
        .iter()
        .cloned()
        .partition(|t| t.chars().all(|c| c.is_ascii_digit()))
}

fn without(tokens: &Tokens, excluded: &[&str]) -> Tokens {
    tokens
        .iter()
        .filter(|t| !excluded.contains(&t.as_str()))
        .cloned()
        .collect()
}

/// Keywords with stopwords removed, falling back to every word
fn keywords(words: &Tokens) -> Tokens {
    let kept = without(words, STOPWORDS);
    if kept.is_empty() { words.clone() } else { kept }
}

/// "a" or "b" when the tokens mention a lettered section
fn section_of(tokens: &Tokens) -> Option<&'static str> {
    if !tokens.contains("section") {
        return None;
    }
    if tokens.contains("a") {
        Some("a")
    } else if tokens.contains("b") {
        Some("b")
    } else {
        None
    }
}

fn question_section(question: &str) -> Option<&'static str> {
    let lowered = question.to_lowercase();
    if lowered.contains("section a") {
        Some("a")
    } else if lowered.contains("section b") {
        Some("b")
    } else {
        None
    }
}

/// Numbers and words of one sentence
struct SentenceTokens {
    numbers: Tokens,
    words: Tokens,
}

/// Per-chunk token sets computed once per verification call
struct IndexedChunk {
    chunk_id: Uuid,
    tokens: Tokens,
    sentences: Vec<SentenceTokens>,
}

impl IndexedChunk {
    fn new(chunk: &RetrievedChunk) -> Self {
        let sentences = split_sentences(&chunk.text)
            .into_iter()
            .map(token_set)
            .filter(|tokens| !tokens.is_empty())
            .map(|tokens| {
                let (numbers, words) = split_numeric(&tokens);
                SentenceTokens { numbers, words }
            })
            .collect();
        Self {
            chunk_id: chunk.chunk_id,
            tokens: token_set(&chunk.text),
            sentences,
        }
    }
}

/// Question-level signal shared by every claim
struct QuestionSignal {
    section: Option<&'static str>,
    signal: Tokens,
}

impl QuestionSignal {
    fn new(question: &str) -> Self {
        let (_, words) = split_numeric(&token_set(question));
        Self {
            section: question_section(question),
            signal: without(&keywords(&words), META_TOKENS),
        }
    }

    fn relevance(&self, claim_signal: &Tokens) -> f64 {
        if self.signal.is_empty() {
            return 0.0;
        }
        overlap(&self.signal, claim_signal)
    }
}

/// Claim verifier scoring support and contradiction by token overlap
#[derive(Debug)]
pub struct LexicalClaimVerifier {
    config: VerificationConfig,
}

impl LexicalClaimVerifier {
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    fn verify_claim(
        &self,
        question: &QuestionSignal,
        claim_text: &str,
        index: &[IndexedChunk],
        chunks: &[RetrievedChunk],
        preferred: &HashSet<Uuid>,
    ) -> Claim {
        let claim_tokens = token_set(claim_text);
        let (claim_numbers, claim_words) = split_numeric(&claim_tokens);
        let claim_section = section_of(&claim_words);

        // A claim about another section than the one asked about is off topic.
        let sectioned = match (question.section, claim_section) {
            (Some(asked), Some(claimed)) if asked != claimed => return Claim::unsupported(claim_text),
            (Some(_), Some(_)) => true,
            _ => false,
        };

        let claim_signal = without(&keywords(&claim_words), META_TOKENS);
        let allow_contradictions = question.relevance(&claim_signal) >= RELEVANCE_THRESHOLD;

        let mut best: Option<&IndexedChunk> = None;
        let mut support_score = 0.0;
        for chunk in index {
            let score = overlap(&claim_tokens, &chunk.tokens);
            if score > support_score {
                support_score = score;
                best = Some(chunk);
            }
        }

        let mut contradiction_score: f64 = 0.0;
        let mut contradict_ids: Vec<Uuid> = Vec::new();
        let mut flag = |id: Uuid, score: f64, ids: &mut Vec<Uuid>| {
            if !ids.contains(&id) {
                ids.push(id);
            }
            contradiction_score = contradiction_score.max(score.max(CONTRADICTION_FLOOR));
        };

        if allow_contradictions && !claim_numbers.is_empty() && !claim_words.is_empty() {
            if let Some(best) = best {
                let mut best_sentence = None;
                let mut best_sentence_score = 0.0;
                for (idx, sentence) in best.sentences.iter().enumerate() {
                    let score = overlap(&claim_words, &sentence.words);
                    if score > best_sentence_score {
                        best_sentence_score = score;
                        best_sentence = Some(idx);
                    }
                }

                for (idx, sentence) in best.sentences.iter().enumerate() {
                    if Some(idx) == best_sentence {
                        continue;
                    }
                    if sentence.numbers.is_empty() || !sentence.numbers.is_disjoint(&claim_numbers) {
                        continue;
                    }
                    if sectioned
                        && section_of(&sentence.words).is_some_and(|s| Some(s) != claim_section)
                    {
                        continue;
                    }
                    let score = overlap(&claim_words, &sentence.words);
                    if score >= OVERLAP_THRESHOLD {
                        flag(best.chunk_id, score, &mut contradict_ids);
                        break;
                    }
                }
            }

            for chunk in index {
                if best.is_some_and(|b| b.chunk_id == chunk.chunk_id) {
                    continue;
                }
                if sectioned && section_of(&chunk.tokens).is_some_and(|s| Some(s) != claim_section) {
                    continue;
                }
                let (numbers, words) = split_numeric(&chunk.tokens);
                if numbers.is_empty() || !numbers.is_disjoint(&claim_numbers) {
                    continue;
                }
                let score = overlap(&claim_words, &words);
                if score >= OVERLAP_THRESHOLD {
                    flag(chunk.chunk_id, score, &mut contradict_ids);
                }
            }
        }

        let support_ids = match best {
            Some(best) if support_score >= OVERLAP_THRESHOLD => {
                prioritize_ids(vec![best.chunk_id], preferred)
            }
            _ => Vec::new(),
        };
        let contradict_ids = prioritize_ids(contradict_ids, preferred);
        let evidence = build_evidence(chunks, &support_ids, &contradict_ids, &self.config);

        Claim::scored(claim_text, support_score, contradiction_score, evidence)
    }
}

#[async_trait]
impl ClaimVerifier for LexicalClaimVerifier {
    async fn verify(
        &self,
        question: &str,
        claim_texts: &[String],
        chunks: &[RetrievedChunk],
        cited_ids: &[Uuid],
    ) -> Result<Vec<Claim>, DomainError> {
        let question = QuestionSignal::new(question);
        let index: Vec<IndexedChunk> = chunks.iter().map(IndexedChunk::new).collect();
        let preferred: HashSet<Uuid> = cited_ids.iter().copied().collect();

        Ok(claim_texts
            .iter()
            .map(|text| self.verify_claim(&question, text, &index, chunks, &preferred))
            .collect())
    }

    fn verifier_name(&self) -> &'static str {
        "lexical"
    }
}
