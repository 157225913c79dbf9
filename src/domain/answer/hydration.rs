//! Read path: rebuild a response from a stored answer without trusting its
//! stored summary

use serde_json::{Map, Value};

use super::coerce::{
    coerce_citation_groups, coerce_citations, coerce_claims, coerce_highlight_claims,
    coerce_summary,
};
use super::StoredAnswer;
use crate::domain::verification::{
    check_consistency, derive_summary, Citation, CitationGroup, Claim, ClaimHighlight,
    PersistedSummary, PlainAnswer, VerificationSummary, VerifiedAnswer,
};
use crate::domain::DomainError;

/// A rebuilt response plus the reasons the stored summary disagreed with it
#[derive(Debug, Clone)]
pub struct Hydrated<C> {
    pub response: VerifiedAnswer<C>,
    pub inconsistencies: Vec<String>,
}

struct Decoded<'a> {
    raw: Map<String, Value>,
    answer: &'a str,
}

impl<'a> Decoded<'a> {
    fn new(record: &'a StoredAnswer) -> Self {
        let raw = record.raw_citations.as_object().cloned().unwrap_or_default();
        Self {
            raw,
            answer: &record.answer,
        }
    }

    fn citations(&self) -> Vec<Citation> {
        coerce_citations(self.raw.get("citations"))
    }

    fn citations_count(&self) -> usize {
        match self.raw.get("ids") {
            Some(Value::Array(ids)) => ids.len(),
            _ => self.citations().len(),
        }
    }

    fn groups(&self, grouped: bool) -> Option<Vec<CitationGroup>> {
        grouped.then(|| coerce_citation_groups(self.raw.get("citation_groups")))
    }

    fn stored_summary(&self) -> Option<PersistedSummary> {
        coerce_summary(self.raw.get("verification_summary"))
    }

    /// Claims the summary is derived from: stored claims, else (when the
    /// shape reads highlights) highlight claims with their evidence dropped
    fn summary_claims(&self, base: &[Claim], use_highlights: bool) -> Vec<Claim> {
        if !base.is_empty() {
            return base.to_vec();
        }
        if use_highlights {
            return coerce_claims(self.raw.get("claims_highlights"));
        }
        Vec::new()
    }

    fn summarize(&self, summary_claims: &[Claim]) -> (VerificationSummary, Vec<String>) {
        let citations_count = self.citations_count();
        let stored = self.stored_summary();
        let summary = derive_summary(self.answer, summary_claims, stored.as_ref(), citations_count);

        let inconsistencies = match &stored {
            Some(persisted) => check_consistency(
                self.answer,
                summary_claims,
                &persisted.as_stored(self.answer, citations_count),
                citations_count,
            ),
            None => Vec::new(),
        };
        (summary, inconsistencies)
    }
}

/// Plain answer with its stored citations
pub fn hydrate_plain(record: &StoredAnswer, grouped: bool) -> PlainAnswer {
    let decoded = Decoded::new(record);
    PlainAnswer {
        answer: record.answer.clone(),
        citations: decoded.citations(),
        citation_groups: decoded.groups(grouped),
    }
}

/// Verified answer with plain claims
pub fn hydrate_verified(record: &StoredAnswer, grouped: bool) -> Result<Hydrated<Claim>, DomainError> {
    let decoded = Decoded::new(record);
    let claims = coerce_claims(decoded.raw.get("claims"));
    let summary_claims = decoded.summary_claims(&claims, grouped);
    let (summary, inconsistencies) = decoded.summarize(&summary_claims);

    let mut response = VerifiedAnswer::new(
        record.answer.clone(),
        summary.answer_style,
        decoded.citations(),
        claims,
        summary,
    )?;
    response.citation_groups = decoded.groups(grouped);

    Ok(Hydrated {
        response,
        inconsistencies,
    })
}

/// Verified answer with highlighted claims
///
/// Falls back to the plain claims (without evidence) when no highlight claims
/// were stored.
pub fn hydrate_highlights(
    record: &StoredAnswer,
    grouped: bool,
) -> Result<Hydrated<ClaimHighlight>, DomainError> {
    let decoded = Decoded::new(record);
    let base = coerce_claims(decoded.raw.get("claims"));
    let highlights = coerce_highlight_claims(decoded.raw.get("claims_highlights"));
    let summary_claims = decoded.summary_claims(&base, true);
    let (summary, inconsistencies) = decoded.summarize(&summary_claims);

    let claims = if highlights.is_empty() {
        base.iter().map(ClaimHighlight::without_evidence).collect()
    } else {
        highlights
    };

    let mut response = VerifiedAnswer::new(
        record.answer.clone(),
        summary.answer_style,
        decoded.citations(),
        claims,
        summary,
    )?;
    response.citation_groups = decoded.groups(grouped);

    Ok(Hydrated {
        response,
        inconsistencies,
    })
}
