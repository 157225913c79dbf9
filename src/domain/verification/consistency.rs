//! Diagnostic comparison of a stored summary against its claims and answer text

use super::answer_text::answer_style_for;
use super::claim::Verdicted;
use super::summary::{VerdictCounts, VerificationSummary};
use super::Verdict;

/// Reason codes for every way `summary` disagrees with `claims` and `answer`.
///
/// An empty result means the summary is internally consistent.
pub fn check_consistency<C: Verdicted>(
    answer: &str,
    claims: &[C],
    summary: &VerificationSummary,
    citations_count: usize,
) -> Vec<String> {
    let mut reasons = Vec::new();
    let expected = VerdictCounts::from_claims(claims);
    let stored = summary.counts();

    for verdict in Verdict::ALL {
        let (want, got) = (expected.get(verdict), stored.get(verdict));
        if want != got {
            reasons.push(format!(
                "summary_count_mismatch(verdict={}, expected={}, got={})",
                verdict, want, got
            ));
        }
    }

    if summary.has_contradictions != expected.has_contradictions() {
        reasons.push("summary_has_contradictions_mismatch".to_string());
    }

    let expected_overall = expected.overall_verdict(answer, citations_count);
    if summary.overall_verdict != expected_overall {
        reasons.push(format!(
            "summary_overall_verdict_mismatch(expected={}, got={})",
            expected_overall, summary.overall_verdict
        ));
    }

    let expected_style = answer_style_for(answer, expected_overall);
    if summary.answer_style != expected_style {
        reasons.push(format!(
            "summary_answer_style_mismatch(expected={}, got={})",
            expected_style, summary.answer_style
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verification::summary::{derive_summary, summarize_claims};
    use crate::domain::verification::{AnswerStyle, Claim, OverallVerdict};

    fn claim(verdict: Verdict) -> Claim {
        let mut c = Claim::unsupported("c");
        c.verdict = verdict;
        c
    }

    #[test]
    fn test_fresh_summary_is_consistent() {
        let claims = vec![claim(Verdict::Supported), claim(Verdict::Conflicting)];
        let summary = derive_summary("answer", &claims, None, 1);
        assert!(check_consistency("answer", &claims, &summary, 1).is_empty());
    }

    #[test]
    fn test_count_mismatch_reason() {
        let claims = vec![claim(Verdict::Supported)];
        let mut summary = summarize_claims(&claims, "a", 1);
        summary.supported_count = 0;

        let reasons = check_consistency("a", &claims, &summary, 1);
        assert_eq!(
            reasons,
            vec!["summary_count_mismatch(verdict=SUPPORTED, expected=1, got=0)".to_string()]
        );
    }

    #[test]
    fn test_flag_verdict_and_style_mismatches() {
        let claims = vec![claim(Verdict::Contradicted)];
        let mut summary = summarize_claims(&claims, "a", 1);
        summary.has_contradictions = false;
        summary.overall_verdict = OverallVerdict::Ok;
        summary.answer_style = AnswerStyle::ConflictRewritten;

        let reasons = check_consistency("a", &claims, &summary, 1);
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], "summary_has_contradictions_mismatch");
        assert_eq!(
            reasons[1],
            "summary_overall_verdict_mismatch(expected=HAS_CONTRADICTIONS, got=OK)"
        );
        assert_eq!(
            reasons[2],
            "summary_answer_style_mismatch(expected=ORIGINAL, got=CONFLICT_REWRITTEN)"
        );
    }
}
