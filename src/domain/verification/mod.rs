//! Claim verification: verdict policy, evidence, highlights and summaries

mod alignment;
mod answer_text;
mod citation;
mod claim;
mod config;
mod consistency;
mod extraction;
mod highlight;
mod response;
mod summary;
mod verdict;

pub use alignment::{build_evidence, prioritize_ids, ClaimVerifier};
pub use answer_text::{
    answer_style_for, classify_answer_text, signals_insufficient_evidence,
    strip_contradiction_prefix, AnswerTextKind, CONTRADICTION_PREFIX, INSUFFICIENT_EVIDENCE_MARKER,
};
pub use citation::{
    build_citation_groups, build_citations, build_snippet, compute_absolute_offsets, Citation,
    CitationGroup, Snippet, SNIPPET_MAX_CHARS,
};
pub use claim::{Claim, ClaimHighlight, Evidence, EvidenceHighlight, HighlightSpan, Verdicted};
pub use config::VerificationConfig;
pub use consistency::check_consistency;
pub use extraction::{sentence_claims, ClaimExtractor};
pub use highlight::{highlight_with_token_window, token_window_span, EvidenceHighlighter};
pub use response::{PlainAnswer, VerifiedAnswer};
pub use summary::{
    derive_summary, rewrite_verified_answer, summarize_claims, PersistedSummary, VerdictCounts,
    VerificationSummary,
};
pub use verdict::{AnswerStyle, EvidenceRelation, OverallVerdict, Verdict};

#[cfg(test)]
pub use alignment::mock::MockClaimVerifier;
