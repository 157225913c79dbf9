//! Verification configuration types

use serde::{Deserialize, Serialize};

fn default_max_support_evidence() -> usize {
    2
}

fn default_max_contradict_evidence() -> usize {
    1
}

fn default_chunk_text_limit() -> usize {
    900
}

fn default_max_fake_claims() -> usize {
    5
}

/// Limits applied while extracting claims and aligning evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Maximum SUPPORTS evidence items per claim
    #[serde(default = "default_max_support_evidence")]
    pub max_support_evidence: usize,

    /// Maximum CONTRADICTS evidence items per claim
    #[serde(default = "default_max_contradict_evidence")]
    pub max_contradict_evidence: usize,

    /// Characters of chunk text sent to the model for verification and highlighting
    #[serde(default = "default_chunk_text_limit")]
    pub chunk_text_limit: usize,

    /// Claims kept by the sentence extractor
    #[serde(default = "default_max_fake_claims")]
    pub max_fake_claims: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_support_evidence: default_max_support_evidence(),
            max_contradict_evidence: default_max_contradict_evidence(),
            chunk_text_limit: default_chunk_text_limit(),
            max_fake_claims: default_max_fake_claims(),
        }
    }
}
