//! Verdict enums and the score-to-verdict rule

use serde::{Deserialize, Serialize};
use std::fmt;

/// Support score at or above which a claim is fully supported
pub const SUPPORTED_THRESHOLD: f64 = 0.75;
/// Support score at or above which a claim is weakly supported
pub const WEAK_SUPPORT_THRESHOLD: f64 = 0.4;
/// Score at or above which contradiction (and, paired with it, conflict) applies
pub const CONTRADICTION_THRESHOLD: f64 = 0.6;

/// Alignment of one claim against the retrieved evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Supported,
    WeakSupport,
    Unsupported,
    Contradicted,
    Conflicting,
}

impl Verdict {
    pub const ALL: [Verdict; 5] = [
        Verdict::Supported,
        Verdict::WeakSupport,
        Verdict::Unsupported,
        Verdict::Contradicted,
        Verdict::Conflicting,
    ];

    /// Derive the verdict from a (support, contradiction) score pair
    pub fn from_scores(support_score: f64, contradiction_score: f64) -> Self {
        if contradiction_score >= CONTRADICTION_THRESHOLD && support_score >= CONTRADICTION_THRESHOLD {
            Verdict::Conflicting
        } else if contradiction_score >= CONTRADICTION_THRESHOLD {
            Verdict::Contradicted
        } else if support_score >= SUPPORTED_THRESHOLD {
            Verdict::Supported
        } else if support_score >= WEAK_SUPPORT_THRESHOLD {
            Verdict::WeakSupport
        } else {
            Verdict::Unsupported
        }
    }

    /// Case-insensitive parse of the wire name
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "SUPPORTED" => Some(Verdict::Supported),
            "WEAK_SUPPORT" => Some(Verdict::WeakSupport),
            "UNSUPPORTED" => Some(Verdict::Unsupported),
            "CONTRADICTED" => Some(Verdict::Contradicted),
            "CONFLICTING" => Some(Verdict::Conflicting),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "SUPPORTED",
            Verdict::WeakSupport => "WEAK_SUPPORT",
            Verdict::Unsupported => "UNSUPPORTED",
            Verdict::Contradicted => "CONTRADICTED",
            Verdict::Conflicting => "CONFLICTING",
        }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Verdict::Contradicted | Verdict::Conflicting)
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Verdict::Supported | Verdict::WeakSupport)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an evidence chunk relates to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceRelation {
    Supports,
    Contradicts,
    Related,
}

impl EvidenceRelation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "SUPPORTS" => Some(EvidenceRelation::Supports),
            "CONTRADICTS" => Some(EvidenceRelation::Contradicts),
            "RELATED" => Some(EvidenceRelation::Related),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceRelation::Supports => "SUPPORTS",
            EvidenceRelation::Contradicts => "CONTRADICTS",
            EvidenceRelation::Related => "RELATED",
        }
    }
}

impl fmt::Display for EvidenceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer-level verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallVerdict {
    Ok,
    HasContradictions,
    InsufficientEvidence,
}

impl OverallVerdict {
    /// Insufficiency wins over contradictions, which win over OK
    pub fn compute(insufficient_evidence: bool, has_contradictions: bool) -> Self {
        if insufficient_evidence {
            OverallVerdict::InsufficientEvidence
        } else if has_contradictions {
            OverallVerdict::HasContradictions
        } else {
            OverallVerdict::Ok
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "OK" => Some(OverallVerdict::Ok),
            "HAS_CONTRADICTIONS" => Some(OverallVerdict::HasContradictions),
            "INSUFFICIENT_EVIDENCE" => Some(OverallVerdict::InsufficientEvidence),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallVerdict::Ok => "OK",
            OverallVerdict::HasContradictions => "HAS_CONTRADICTIONS",
            OverallVerdict::InsufficientEvidence => "INSUFFICIENT_EVIDENCE",
        }
    }
}

impl fmt::Display for OverallVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the returned answer text was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStyle {
    Original,
    ConflictRewritten,
    InsufficientEvidence,
}

impl AnswerStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "ORIGINAL" => Some(AnswerStyle::Original),
            "CONFLICT_REWRITTEN" => Some(AnswerStyle::ConflictRewritten),
            "INSUFFICIENT_EVIDENCE" => Some(AnswerStyle::InsufficientEvidence),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStyle::Original => "ORIGINAL",
            AnswerStyle::ConflictRewritten => "CONFLICT_REWRITTEN",
            AnswerStyle::InsufficientEvidence => "INSUFFICIENT_EVIDENCE",
        }
    }
}

impl fmt::Display for AnswerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
