//! Final response objects returned to callers

use serde::{Deserialize, Serialize};

use super::{AnswerStyle, Citation, CitationGroup, VerificationSummary};
use crate::domain::DomainError;

/// Answer with citations only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_groups: Option<Vec<CitationGroup>>,
}

/// Verified answer; `C` is either plain claims or highlighted claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedAnswer<C> {
    pub answer: String,
    pub answer_style: AnswerStyle,
    pub citations: Vec<Citation>,
    pub claims: Vec<C>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_groups: Option<Vec<CitationGroup>>,
    pub verification_summary: VerificationSummary,
}

impl<C> VerifiedAnswer<C> {
    /// Fails when the top-level style disagrees with the summary's style
    pub fn new(
        answer: String,
        answer_style: AnswerStyle,
        citations: Vec<Citation>,
        claims: Vec<C>,
        verification_summary: VerificationSummary,
    ) -> Result<Self, DomainError> {
        if answer_style != verification_summary.answer_style {
            return Err(DomainError::contract(format!(
                "answer_style {} does not match verification_summary.answer_style {}",
                answer_style, verification_summary.answer_style
            )));
        }
        Ok(Self {
            answer,
            answer_style,
            citations,
            claims,
            citation_groups: None,
            verification_summary,
        })
    }

    pub fn with_groups(mut self, groups: Vec<CitationGroup>) -> Self {
        self.citation_groups = Some(groups);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verification::{summarize_claims, Claim};

    #[test]
    fn test_style_mismatch_is_contract_error() {
        let summary = summarize_claims::<Claim>(&[], "a", 0);
        let result = VerifiedAnswer::<Claim>::new(
            "a".into(),
            AnswerStyle::ConflictRewritten,
            vec![],
            vec![],
            summary,
        );
        assert!(result.unwrap_err().is_contract());
    }

    #[test]
    fn test_serialization_omits_missing_groups() {
        let summary = summarize_claims::<Claim>(&[], "a", 0);
        let response =
            VerifiedAnswer::<Claim>::new("a".into(), AnswerStyle::Original, vec![], vec![], summary)
                .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("citation_groups").is_none());
        assert_eq!(json["answer_style"], "ORIGINAL");
        assert_eq!(json["verification_summary"]["answer_style"], "ORIGINAL");

        let json = serde_json::to_value(response.with_groups(vec![])).unwrap();
        assert!(json["citation_groups"].as_array().unwrap().is_empty());
    }
}
