//! JSON payload persisted alongside an answer

use serde::Serialize;
use uuid::Uuid;

use crate::domain::verification::{
    Citation, CitationGroup, Claim, ClaimHighlight, VerificationSummary,
};
use crate::domain::DomainError;

/// Everything the write path records in `StoredAnswer::raw_citations`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnswerPayload {
    pub ids: Vec<Uuid>,
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_groups: Option<Vec<CitationGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<Claim>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_highlights: Option<Vec<ClaimHighlight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_summary: Option<VerificationSummary>,
}

impl AnswerPayload {
    pub fn new(ids: Vec<Uuid>, citations: Vec<Citation>) -> Self {
        Self {
            ids,
            citations,
            ..Self::default()
        }
    }

    pub fn with_groups(mut self, groups: Option<Vec<CitationGroup>>) -> Self {
        self.citation_groups = groups;
        self
    }

    pub fn with_claims(mut self, claims: Vec<Claim>) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<ClaimHighlight>) -> Self {
        self.claims_highlights = Some(highlights);
        self
    }

    pub fn with_summary(mut self, summary: VerificationSummary) -> Self {
        self.verification_summary = Some(summary);
        self
    }

    pub fn to_value(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::internal(format!("Failed to encode answer payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verification::summarize_claims;

    #[test]
    fn test_plain_payload_has_only_ids_and_citations() {
        let value = AnswerPayload::new(vec![Uuid::nil()], vec![]).to_value().unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["ids"][0], Uuid::nil().to_string());
    }

    #[test]
    fn test_verified_payload_keys() {
        let claims = vec![Claim::unsupported("A.")];
        let summary = summarize_claims(&claims, "A.", 0);
        let value = AnswerPayload::new(vec![], vec![])
            .with_claims(claims)
            .with_summary(summary)
            .to_value()
            .unwrap();

        assert_eq!(value["claims"][0]["verdict"], "UNSUPPORTED");
        assert_eq!(value["verification_summary"]["unsupported_count"], 1);
        assert!(value.get("claims_highlights").is_none());
    }
}
