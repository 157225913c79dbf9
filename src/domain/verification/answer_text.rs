//! Literal answer-text markers and their classification

use super::{AnswerStyle, OverallVerdict};

/// Banner prepended to answers rewritten because of contradictions
pub const CONTRADICTION_PREFIX: &str =
    "Contradictions detected in the source material. See claims below for details.\n\n";

/// Lowercase lead phrase of every insufficient-evidence answer
pub const INSUFFICIENT_EVIDENCE_MARKER: &str = "insufficient evidence";

/// What the answer text itself says about how it was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerTextKind {
    ConflictRewritten,
    InsufficientEvidence,
    Plain,
}

impl AnswerTextKind {
    pub fn is_conflict_rewritten(&self) -> bool {
        matches!(self, AnswerTextKind::ConflictRewritten)
    }

    pub fn is_insufficient_evidence(&self) -> bool {
        matches!(self, AnswerTextKind::InsufficientEvidence)
    }
}

/// Single place where answer-text markers are inspected
pub fn classify_answer_text(answer: &str) -> AnswerTextKind {
    let trimmed = answer.trim();
    if trimmed.starts_with(CONTRADICTION_PREFIX) {
        AnswerTextKind::ConflictRewritten
    } else if trimmed.to_lowercase().starts_with(INSUFFICIENT_EVIDENCE_MARKER) {
        AnswerTextKind::InsufficientEvidence
    } else {
        AnswerTextKind::Plain
    }
}

/// True when the answer text reads as an insufficient-evidence answer
pub fn signals_insufficient_evidence(answer: &str) -> bool {
    classify_answer_text(answer).is_insufficient_evidence()
}

/// Remove a leading contradiction banner (and whitespace after it)
pub fn strip_contradiction_prefix(answer: &str) -> &str {
    match answer.strip_prefix(CONTRADICTION_PREFIX) {
        Some(rest) => rest.trim_start(),
        None => answer,
    }
}

/// Style implied by the answer text and the overall verdict
pub fn answer_style_for(answer: &str, overall: OverallVerdict) -> AnswerStyle {
    if classify_answer_text(answer).is_conflict_rewritten() {
        AnswerStyle::ConflictRewritten
    } else if overall == OverallVerdict::InsufficientEvidence {
        AnswerStyle::InsufficientEvidence
    } else {
        AnswerStyle::Original
    }
}
