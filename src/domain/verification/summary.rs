//! Verification summary: aggregation, re-derivation and conflict rewriting

use serde::{Deserialize, Serialize};

use super::answer_text::{
    answer_style_for, classify_answer_text, signals_insufficient_evidence,
    strip_contradiction_prefix, CONTRADICTION_PREFIX,
};
use super::claim::Verdicted;
use super::{AnswerStyle, OverallVerdict, Verdict};

/// Number of claims per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictCounts {
    pub supported: u64,
    pub weak_support: u64,
    pub unsupported: u64,
    pub contradicted: u64,
    pub conflicting: u64,
}

impl VerdictCounts {
    pub fn from_claims<C: Verdicted>(claims: &[C]) -> Self {
        let mut counts = Self::default();
        for claim in claims {
            *counts.slot_mut(claim.verdict()) += 1;
        }
        counts
    }

    pub fn get(&self, verdict: Verdict) -> u64 {
        match verdict {
            Verdict::Supported => self.supported,
            Verdict::WeakSupport => self.weak_support,
            Verdict::Unsupported => self.unsupported,
            Verdict::Contradicted => self.contradicted,
            Verdict::Conflicting => self.conflicting,
        }
    }

    fn slot_mut(&mut self, verdict: Verdict) -> &mut u64 {
        match verdict {
            Verdict::Supported => &mut self.supported,
            Verdict::WeakSupport => &mut self.weak_support,
            Verdict::Unsupported => &mut self.unsupported,
            Verdict::Contradicted => &mut self.contradicted,
            Verdict::Conflicting => &mut self.conflicting,
        }
    }

    pub fn total(&self) -> u64 {
        self.supported + self.weak_support + self.unsupported + self.contradicted + self.conflicting
    }

    pub fn has_contradictions(&self) -> bool {
        self.contradicted + self.conflicting > 0
    }

    pub fn all_unsupported(&self) -> bool {
        self.total() > 0 && self.unsupported == self.total()
    }

    /// Overall verdict implied by these counts and the answer text
    pub fn overall_verdict(&self, answer: &str, citations_count: usize) -> OverallVerdict {
        let insufficient =
            signals_insufficient_evidence(answer) || (citations_count == 0 && self.all_unsupported());
        OverallVerdict::compute(insufficient, self.has_contradictions())
    }
}

/// Aggregate view of claim verdicts returned with every verified answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub supported_count: u64,
    pub weak_support_count: u64,
    pub unsupported_count: u64,
    pub contradicted_count: u64,
    pub conflicting_count: u64,
    pub has_contradictions: bool,
    pub overall_verdict: OverallVerdict,
    pub answer_style: AnswerStyle,
}

impl VerificationSummary {
    fn from_counts(counts: VerdictCounts, overall_verdict: OverallVerdict) -> Self {
        Self {
            supported_count: counts.supported,
            weak_support_count: counts.weak_support,
            unsupported_count: counts.unsupported,
            contradicted_count: counts.contradicted,
            conflicting_count: counts.conflicting,
            has_contradictions: counts.has_contradictions(),
            overall_verdict,
            answer_style: AnswerStyle::Original,
        }
    }

    pub fn counts(&self) -> VerdictCounts {
        VerdictCounts {
            supported: self.supported_count,
            weak_support: self.weak_support_count,
            unsupported: self.unsupported_count,
            contradicted: self.contradicted_count,
            conflicting: self.conflicting_count,
        }
    }
}

/// Summary of a stored answer as decoded from persisted JSON
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSummary {
    pub counts: VerdictCounts,
    pub has_contradictions: Option<bool>,
    pub overall_verdict: Option<OverallVerdict>,
    pub answer_style: Option<AnswerStyle>,
}

impl PersistedSummary {
    /// Style recorded for the stored answer; inferred when missing or invalid
    pub fn inferred_answer_style(&self, answer: &str) -> AnswerStyle {
        if let Some(style) = self.answer_style {
            return style;
        }
        if classify_answer_text(answer).is_conflict_rewritten() {
            AnswerStyle::ConflictRewritten
        } else if self.overall_verdict == Some(OverallVerdict::InsufficientEvidence) {
            AnswerStyle::InsufficientEvidence
        } else if self.has_contradictions == Some(true) {
            AnswerStyle::ConflictRewritten
        } else {
            AnswerStyle::Original
        }
    }

    /// The stored summary taken at face value, with missing fields filled in
    /// from its own counts
    pub fn as_stored(&self, answer: &str, citations_count: usize) -> VerificationSummary {
        VerificationSummary {
            supported_count: self.counts.supported,
            weak_support_count: self.counts.weak_support,
            unsupported_count: self.counts.unsupported,
            contradicted_count: self.counts.contradicted,
            conflicting_count: self.counts.conflicting,
            has_contradictions: self
                .has_contradictions
                .unwrap_or_else(|| self.counts.has_contradictions()),
            overall_verdict: self
                .overall_verdict
                .unwrap_or_else(|| self.counts.overall_verdict(answer, citations_count)),
            answer_style: self.inferred_answer_style(answer),
        }
    }
}

/// Counts, contradiction flag and overall verdict for a set of claims
pub fn summarize_claims<C: Verdicted>(claims: &[C], answer: &str, citations_count: usize) -> VerificationSummary {
    let counts = VerdictCounts::from_claims(claims);
    let overall = counts.overall_verdict(answer, citations_count);
    VerificationSummary::from_counts(counts, overall)
}

/// Recompute the summary for an answer.
///
/// Claims are authoritative when present. Otherwise the persisted counts are
/// used and a persisted overall verdict survives only if it agrees with the
/// recomputed one. The style always follows the answer text.
pub fn derive_summary<C: Verdicted>(
    answer: &str,
    claims: &[C],
    persisted: Option<&PersistedSummary>,
    citations_count: usize,
) -> VerificationSummary {
    let mut summary = if !claims.is_empty() {
        summarize_claims(claims, answer, citations_count)
    } else {
        let counts = persisted.map(|p| p.counts).unwrap_or_default();
        let computed = counts.overall_verdict(answer, citations_count);
        let overall = match persisted.and_then(|p| p.overall_verdict) {
            Some(stored) if stored == computed => stored,
            _ => computed,
        };
        VerificationSummary::from_counts(counts, overall)
    };
    summary.answer_style = answer_style_for(answer, summary.overall_verdict);
    summary
}

/// Rewrite an answer whose claims contradict the sources into a structured
/// breakdown, recording the resulting style on `summary`.
///
/// Applying it to an already rewritten answer yields the same text.
pub fn rewrite_verified_answer<C: Verdicted>(
    answer: &str,
    claims: &[C],
    summary: &mut VerificationSummary,
) -> (String, AnswerStyle) {
    let clean_answer = strip_contradiction_prefix(answer);

    if summary.overall_verdict == OverallVerdict::InsufficientEvidence {
        summary.answer_style = AnswerStyle::InsufficientEvidence;
        return (clean_answer.to_string(), AnswerStyle::InsufficientEvidence);
    }
    if !summary.has_contradictions {
        summary.answer_style = AnswerStyle::Original;
        return (clean_answer.to_string(), AnswerStyle::Original);
    }

    let supported = claim_texts(claims, |v| v.is_support());
    let conflicted = claim_texts(claims, |v| v.is_contradiction());
    let unsupported = claim_texts(claims, |v| v == Verdict::Unsupported);

    if supported.is_empty() && conflicted.is_empty() && unsupported.is_empty() {
        summary.answer_style = AnswerStyle::Original;
        return (clean_answer.to_string(), AnswerStyle::Original);
    }

    let mut sections = vec![
        format_section("What the sources support", &supported),
        format_section("Where the sources conflict", &conflicted),
    ];
    if !unsupported.is_empty() {
        sections.push(format_section("What's not supported", &unsupported));
    }

    summary.answer_style = AnswerStyle::ConflictRewritten;
    (
        format!("{}{}", CONTRADICTION_PREFIX, sections.join("\n\n")),
        AnswerStyle::ConflictRewritten,
    )
}

fn claim_texts<C: Verdicted>(claims: &[C], keep: impl Fn(Verdict) -> bool) -> Vec<&str> {
    claims
        .iter()
        .filter(|c| keep(c.verdict()))
        .map(|c| c.claim_text())
        .collect()
}

fn format_section(title: &str, items: &[&str]) -> String {
    let mut lines = vec![title.to_string()];
    if items.is_empty() {
        lines.push("- None.".to_string());
    } else {
        lines.extend(items.iter().map(|item| format!("- {}", item)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verification::Claim;

    fn claim(text: &str, verdict: Verdict) -> Claim {
        let mut c = Claim::unsupported(text);
        c.verdict = verdict;
        c
    }

    #[test]
    fn test_counts_sum_to_claims_over_all_combinations() {
        // every multiset of up to three verdicts
        for a in Verdict::ALL {
            for b in Verdict::ALL {
                for c in Verdict::ALL {
                    let claims = vec![claim("a", a), claim("b", b), claim("c", c)];
                    let summary = summarize_claims(&claims, "answer", 1);
                    assert_eq!(summary.counts().total(), 3);

                    let expected = [a, b, c].iter().any(|v| v.is_contradiction());
                    assert_eq!(summary.has_contradictions, expected);
                }
            }
        }
    }

    #[test]
    fn test_insufficient_from_answer_text() {
        let claims = vec![claim("x", Verdict::Contradicted)];
        let summary = summarize_claims(&claims, " Insufficient evidence. Try again.", 2);
        assert_eq!(summary.overall_verdict, OverallVerdict::InsufficientEvidence);
        assert!(summary.has_contradictions);
    }

    #[test]
    fn test_insufficient_when_uncited_and_all_unsupported() {
        let claims = vec![claim("x", Verdict::Unsupported), claim("y", Verdict::Unsupported)];
        assert_eq!(
            summarize_claims(&claims, "answer", 0).overall_verdict,
            OverallVerdict::InsufficientEvidence
        );
        assert_eq!(summarize_claims(&claims, "answer", 1).overall_verdict, OverallVerdict::Ok);
        assert_eq!(
            summarize_claims::<Claim>(&[], "answer", 0).overall_verdict,
            OverallVerdict::Ok
        );
    }

    #[test]
    fn test_rewrite_builds_sections() {
        let claims = vec![
            claim("Fee is 25.", Verdict::Supported),
            claim("Fee is 30.", Verdict::Contradicted),
        ];
        let mut summary = summarize_claims(&claims, "Fee is 25. Fee is 30.", 2);
        assert_eq!(summary.overall_verdict, OverallVerdict::HasContradictions);

        let (answer, style) = rewrite_verified_answer("Fee is 25. Fee is 30.", &claims, &mut summary);

        assert_eq!(style, AnswerStyle::ConflictRewritten);
        assert_eq!(summary.answer_style, AnswerStyle::ConflictRewritten);
        assert_eq!(
            answer,
            format!(
                "{}What the sources support\n- Fee is 25.\n\nWhere the sources conflict\n- Fee is 30.",
                CONTRADICTION_PREFIX
            )
        );
    }

    #[test]
    fn test_rewrite_lists_unsupported_and_none() {
        let claims = vec![
            claim("Fee is 30.", Verdict::Conflicting),
            claim("Office is closed.", Verdict::Unsupported),
        ];
        let mut summary = summarize_claims(&claims, "x", 1);
        let (answer, _) = rewrite_verified_answer("x", &claims, &mut summary);

        assert!(answer.contains("What the sources support\n- None."));
        assert!(answer.ends_with("What's not supported\n- Office is closed."));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let claims = vec![
            claim("A.", Verdict::WeakSupport),
            claim("B.", Verdict::Contradicted),
        ];
        let mut summary = summarize_claims(&claims, "A. B.", 1);
        let (once, _) = rewrite_verified_answer("A. B.", &claims, &mut summary);
        let (twice, style) = rewrite_verified_answer(&once, &claims, &mut summary);

        assert_eq!(once, twice);
        assert_eq!(style, AnswerStyle::ConflictRewritten);
        assert_eq!(twice.matches(CONTRADICTION_PREFIX).count(), 1);
    }

    #[test]
    fn test_rewrite_passthrough_styles() {
        let claims = vec![claim("A.", Verdict::Supported)];
        let mut summary = summarize_claims(&claims, "A.", 1);
        let (answer, style) = rewrite_verified_answer("A.", &claims, &mut summary);
        assert_eq!((answer.as_str(), style), ("A.", AnswerStyle::Original));

        let mut summary = summarize_claims::<Claim>(&[], "insufficient evidence", 0);
        let (answer, style) = rewrite_verified_answer("insufficient evidence", &[] as &[Claim], &mut summary);
        assert_eq!(answer, "insufficient evidence");
        assert_eq!(style, AnswerStyle::InsufficientEvidence);
        assert_eq!(summary.answer_style, AnswerStyle::InsufficientEvidence);
    }

    #[test]
    fn test_rewrite_with_contradictions_but_no_claims_keeps_original() {
        let mut summary = summarize_claims::<Claim>(&[], "A.", 1);
        summary.has_contradictions = true;
        let (answer, style) = rewrite_verified_answer("A.", &[] as &[Claim], &mut summary);
        assert_eq!(answer, "A.");
        assert_eq!(style, AnswerStyle::Original);
    }

    #[test]
    fn test_derive_prefers_claims_over_persisted_counts() {
        let claims = vec![claim("A.", Verdict::Supported)];
        let persisted = PersistedSummary::default();
        let summary = derive_summary("A.", &claims, Some(&persisted), 1);
        assert_eq!(summary.supported_count, 1);
        assert_eq!(summary.answer_style, AnswerStyle::Original);
    }

    #[test]
    fn test_derive_from_persisted_counts() {
        let persisted = PersistedSummary {
            counts: VerdictCounts {
                contradicted: 1,
                supported: 2,
                ..Default::default()
            },
            has_contradictions: Some(false),
            overall_verdict: Some(OverallVerdict::Ok),
            answer_style: None,
        };
        let rewritten = format!("{}body", CONTRADICTION_PREFIX);
        let summary = derive_summary::<Claim>(&rewritten, &[], Some(&persisted), 3);

        assert!(summary.has_contradictions);
        assert_eq!(summary.overall_verdict, OverallVerdict::HasContradictions);
        assert_eq!(summary.answer_style, AnswerStyle::ConflictRewritten);
    }

    #[test]
    fn test_derive_without_anything() {
        let summary = derive_summary::<Claim>("insufficient evidence", &[], None, 0);
        assert_eq!(summary.counts().total(), 0);
        assert_eq!(summary.overall_verdict, OverallVerdict::InsufficientEvidence);
        assert_eq!(summary.answer_style, AnswerStyle::InsufficientEvidence);
    }

    #[test]
    fn test_inferred_answer_style() {
        let mut persisted = PersistedSummary::default();
        assert_eq!(persisted.inferred_answer_style("x"), AnswerStyle::Original);

        persisted.has_contradictions = Some(true);
        assert_eq!(persisted.inferred_answer_style("x"), AnswerStyle::ConflictRewritten);

        persisted.overall_verdict = Some(OverallVerdict::InsufficientEvidence);
        assert_eq!(persisted.inferred_answer_style("x"), AnswerStyle::InsufficientEvidence);

        persisted.answer_style = Some(AnswerStyle::Original);
        assert_eq!(persisted.inferred_answer_style("x"), AnswerStyle::Original);
    }
}
