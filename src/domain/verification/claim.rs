//! Claims and the evidence aligned to them

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EvidenceRelation, Verdict};

/// An evidence chunk attached to a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub chunk_id: Uuid,
    pub relation: EvidenceRelation,
    pub snippet: String,
    pub snippet_start: Option<usize>,
    pub snippet_end: Option<usize>,
    pub absolute_start: Option<usize>,
    pub absolute_end: Option<usize>,
}

/// An atomic factual assertion taken from the answer, with its verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_text: String,
    pub verdict: Verdict,
    pub support_score: f64,
    pub contradiction_score: f64,
    pub evidence: Vec<Evidence>,
}

impl Claim {
    /// Claim with zero scores, no evidence and an UNSUPPORTED verdict
    pub fn unsupported(claim_text: impl Into<String>) -> Self {
        Self {
            claim_text: claim_text.into(),
            verdict: Verdict::Unsupported,
            support_score: 0.0,
            contradiction_score: 0.0,
            evidence: Vec::new(),
        }
    }

    /// Claim whose verdict is derived from the two scores
    pub fn scored(
        claim_text: impl Into<String>,
        support_score: f64,
        contradiction_score: f64,
        evidence: Vec<Evidence>,
    ) -> Self {
        Self {
            claim_text: claim_text.into(),
            verdict: Verdict::from_scores(support_score, contradiction_score),
            support_score,
            contradiction_score,
            evidence,
        }
    }
}

/// Evidence with an optional highlight span inside the chunk text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceHighlight {
    pub chunk_id: Uuid,
    pub relation: EvidenceRelation,
    pub snippet: String,
    pub snippet_start: Option<usize>,
    pub snippet_end: Option<usize>,
    pub highlight_start: Option<usize>,
    pub highlight_end: Option<usize>,
    pub highlight_text: Option<String>,
    pub absolute_start: Option<usize>,
    pub absolute_end: Option<usize>,
}

impl EvidenceHighlight {
    /// Carry the evidence over without a highlight
    pub fn unhighlighted(evidence: &Evidence) -> Self {
        Self {
            chunk_id: evidence.chunk_id,
            relation: evidence.relation,
            snippet: evidence.snippet.clone(),
            snippet_start: evidence.snippet_start,
            snippet_end: evidence.snippet_end,
            highlight_start: None,
            highlight_end: None,
            highlight_text: None,
            absolute_start: evidence.absolute_start,
            absolute_end: evidence.absolute_end,
        }
    }

    pub fn with_span(mut self, span: Option<HighlightSpan>) -> Self {
        if let Some(span) = span {
            self.highlight_start = Some(span.start);
            self.highlight_end = Some(span.end);
            self.highlight_text = Some(span.text);
        }
        self
    }
}

/// Character span inside a chunk's full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Claim whose evidence carries highlight spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimHighlight {
    pub claim_text: String,
    pub verdict: Verdict,
    pub support_score: f64,
    pub contradiction_score: f64,
    pub evidence: Vec<EvidenceHighlight>,
}

impl ClaimHighlight {
    pub fn new(claim: &Claim, evidence: Vec<EvidenceHighlight>) -> Self {
        Self {
            claim_text: claim.claim_text.clone(),
            verdict: claim.verdict,
            support_score: claim.support_score,
            contradiction_score: claim.contradiction_score,
            evidence,
        }
    }

    /// Same claim, evidence dropped
    pub fn without_evidence(claim: &Claim) -> Self {
        Self::new(claim, Vec::new())
    }

    /// Plain claim view (evidence dropped) used for summary derivation
    pub fn to_claim(&self) -> Claim {
        Claim {
            claim_text: self.claim_text.clone(),
            verdict: self.verdict,
            support_score: self.support_score,
            contradiction_score: self.contradiction_score,
            evidence: Vec::new(),
        }
    }
}

/// Anything carrying a verdict and claim text
pub trait Verdicted {
    fn verdict(&self) -> Verdict;
    fn claim_text(&self) -> &str;
}

impl Verdicted for Claim {
    fn verdict(&self) -> Verdict {
        self.verdict
    }

    fn claim_text(&self) -> &str {
        &self.claim_text
    }
}

impl Verdicted for ClaimHighlight {
    fn verdict(&self) -> Verdict {
        self.verdict
    }

    fn claim_text(&self) -> &str {
        &self.claim_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_claim_derives_verdict() {
        let claim = Claim::scored("Fee is 25.", 0.9, 0.0, vec![]);
        assert_eq!(claim.verdict, Verdict::Supported);

        let claim = Claim::scored("Fee is 30.", 0.2, 0.8, vec![]);
        assert_eq!(claim.verdict, Verdict::Contradicted);
    }

    #[test]
    fn test_claim_json_shape() {
        let claim = Claim::unsupported("x");
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["verdict"], "UNSUPPORTED");
        assert_eq!(json["support_score"], 0.0);
        assert!(json["evidence"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_highlight_carries_evidence_offsets() {
        let evidence = Evidence {
            chunk_id: Uuid::new_v4(),
            relation: EvidenceRelation::Supports,
            snippet: "fee".into(),
            snippet_start: Some(2),
            snippet_end: Some(5),
            absolute_start: Some(102),
            absolute_end: Some(105),
        };
        let highlight = EvidenceHighlight::unhighlighted(&evidence).with_span(Some(HighlightSpan {
            start: 0,
            end: 3,
            text: "a f".into(),
        }));

        assert_eq!(highlight.snippet_start, Some(2));
        assert_eq!(highlight.absolute_end, Some(105));
        assert_eq!(highlight.highlight_text.as_deref(), Some("a f"));

        let none = EvidenceHighlight::unhighlighted(&evidence).with_span(None);
        assert!(none.highlight_start.is_none());
    }
}
