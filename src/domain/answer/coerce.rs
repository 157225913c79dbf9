//! Parse-or-default decoders for persisted answer JSON.
//!
//! Every function accepts any JSON value (or none) and degrades to an empty or
//! default result instead of failing.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::verification::{
    AnswerStyle, Citation, CitationGroup, Claim, ClaimHighlight, EvidenceHighlight,
    EvidenceRelation, OverallVerdict, PersistedSummary, VerdictCounts, Verdict,
};

/// Score clamped to [0, 1]; 0.0 when missing, non-numeric or NaN
pub fn coerce_score(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed {
        Some(score) if !score.is_nan() => score.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Non-negative integer, or `None` when missing, invalid or negative
pub fn coerce_optional_int(raw: Option<&Value>) -> Option<u64> {
    let parsed: Option<i64> = match raw? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.and_then(|v| u64::try_from(v).ok())
}

/// Non-negative integer defaulting to 0
pub fn coerce_int(raw: Option<&Value>) -> u64 {
    coerce_optional_int(raw).unwrap_or(0)
}

fn coerce_offset(raw: Option<&Value>) -> Option<usize> {
    coerce_optional_int(raw).and_then(|v| usize::try_from(v).ok())
}

fn coerce_page(raw: Option<&Value>) -> Option<i64> {
    coerce_optional_int(raw).and_then(|v| i64::try_from(v).ok())
}

pub fn coerce_uuid(raw: Option<&Value>) -> Option<Uuid> {
    match raw? {
        Value::String(s) => Uuid::parse_str(s.trim()).ok(),
        _ => None,
    }
}

pub fn coerce_verdict(raw: Option<&Value>) -> Option<Verdict> {
    raw?.as_str().and_then(Verdict::parse)
}

pub fn coerce_relation(raw: Option<&Value>) -> Option<EvidenceRelation> {
    raw?.as_str().and_then(EvidenceRelation::parse)
}

pub fn coerce_overall_verdict(raw: Option<&Value>) -> Option<OverallVerdict> {
    raw?.as_str().and_then(OverallVerdict::parse)
}

pub fn coerce_answer_style(raw: Option<&Value>) -> Option<AnswerStyle> {
    raw?.as_str().and_then(AnswerStyle::parse)
}

/// Text of a JSON value: strings as-is, falsy values as empty, anything else printed
pub fn coerce_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(value) if !is_falsy(value) => value.to_string(),
        _ => String::new(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn coerce_title(raw: Option<&Value>) -> Option<String> {
    raw.and_then(Value::as_str).map(String::from)
}

fn objects(raw: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    raw.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Citations with valid chunk and source ids
pub fn coerce_citations(raw: Option<&Value>) -> Vec<Citation> {
    objects(raw)
        .filter_map(|item| {
            let chunk_id = coerce_uuid(item.get("chunk_id"))?;
            let source_id = coerce_uuid(item.get("source_id"))?;
            Some(Citation {
                chunk_id,
                source_id,
                source_title: coerce_title(item.get("source_title")),
                page_start: coerce_page(item.get("page_start")),
                page_end: coerce_page(item.get("page_end")),
                snippet: coerce_text(item.get("snippet")),
                snippet_start: coerce_offset(item.get("snippet_start")),
                snippet_end: coerce_offset(item.get("snippet_end")),
                absolute_start: coerce_offset(item.get("absolute_start")),
                absolute_end: coerce_offset(item.get("absolute_end")),
            })
        })
        .collect()
}

/// Groups with a valid source id; their citations are coerced individually
pub fn coerce_citation_groups(raw: Option<&Value>) -> Vec<CitationGroup> {
    objects(raw)
        .filter_map(|item| {
            Some(CitationGroup {
                source_id: coerce_uuid(item.get("source_id"))?,
                source_title: coerce_title(item.get("source_title")),
                citations: coerce_citations(item.get("citations")),
            })
        })
        .collect()
}

/// Claims with evidence dropped; unknown verdicts become UNSUPPORTED
pub fn coerce_claims(raw: Option<&Value>) -> Vec<Claim> {
    objects(raw)
        .map(|item| Claim {
            claim_text: coerce_text(item.get("claim_text")),
            verdict: coerce_verdict(item.get("verdict")).unwrap_or(Verdict::Unsupported),
            support_score: coerce_score(item.get("support_score")),
            contradiction_score: coerce_score(item.get("contradiction_score")),
            evidence: Vec::new(),
        })
        .collect()
}

/// Highlighted claims; evidence needs a chunk id and a relation
pub fn coerce_highlight_claims(raw: Option<&Value>) -> Vec<ClaimHighlight> {
    objects(raw)
        .map(|item| ClaimHighlight {
            claim_text: coerce_text(item.get("claim_text")),
            verdict: coerce_verdict(item.get("verdict")).unwrap_or(Verdict::Unsupported),
            support_score: coerce_score(item.get("support_score")),
            contradiction_score: coerce_score(item.get("contradiction_score")),
            evidence: coerce_highlight_evidence(item.get("evidence")),
        })
        .collect()
}

fn coerce_highlight_evidence(raw: Option<&Value>) -> Vec<EvidenceHighlight> {
    objects(raw)
        .filter_map(|item| {
            let chunk_id = coerce_uuid(item.get("chunk_id"))?;
            let relation = coerce_relation(item.get("relation"))?;

            let start = coerce_offset(item.get("highlight_start"));
            let end = coerce_offset(item.get("highlight_end"));
            let text = item.get("highlight_text").and_then(Value::as_str);
            let (highlight_start, highlight_end, highlight_text) = match (start, end, text) {
                (Some(s), Some(e), Some(t)) if s < e => (Some(s), Some(e), Some(t.to_string())),
                _ => (None, None, None),
            };

            Some(EvidenceHighlight {
                chunk_id,
                relation,
                snippet: coerce_text(item.get("snippet")),
                snippet_start: coerce_offset(item.get("snippet_start")),
                snippet_end: coerce_offset(item.get("snippet_end")),
                highlight_start,
                highlight_end,
                highlight_text,
                absolute_start: coerce_offset(item.get("absolute_start")),
                absolute_end: coerce_offset(item.get("absolute_end")),
            })
        })
        .collect()
}

/// Stored summary; `None` unless the value is a non-empty object
pub fn coerce_summary(raw: Option<&Value>) -> Option<PersistedSummary> {
    let map = raw?.as_object().filter(|m| !m.is_empty())?;
    Some(PersistedSummary {
        counts: VerdictCounts {
            supported: coerce_int(map.get("supported_count")),
            weak_support: coerce_int(map.get("weak_support_count")),
            unsupported: coerce_int(map.get("unsupported_count")),
            contradicted: coerce_int(map.get("contradicted_count")),
            conflicting: coerce_int(map.get("conflicting_count")),
        },
        has_contradictions: map.get("has_contradictions").and_then(Value::as_bool),
        overall_verdict: coerce_overall_verdict(map.get("overall_verdict")),
        answer_style: coerce_answer_style(map.get("answer_style")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_score() {
        assert_eq!(coerce_score(Some(&json!(0.5))), 0.5);
        assert_eq!(coerce_score(Some(&json!("0.25"))), 0.25);
        assert_eq!(coerce_score(Some(&json!(7))), 1.0);
        assert_eq!(coerce_score(Some(&json!(-2))), 0.0);
        assert_eq!(coerce_score(Some(&json!("high"))), 0.0);
        assert_eq!(coerce_score(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_score(Some(&json!([1]))), 0.0);
        assert_eq!(coerce_score(None), 0.0);
    }

    #[test]
    fn test_coerce_text_blanks_falsy_values() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert_eq!(coerce_text(Some(&falsy)), "", "{}", falsy);
        }
        assert_eq!(coerce_text(None), "");
        assert_eq!(coerce_text(Some(&json!("The fee is 25."))), "The fee is 25.");
        assert_eq!(coerce_text(Some(&json!(25))), "25");
        assert_eq!(coerce_text(Some(&json!(true))), "true");
        assert_eq!(coerce_text(Some(&json!(["a"]))), r#"["a"]"#);
    }

    #[test]
    fn test_coerce_ints() {
        assert_eq!(coerce_int(Some(&json!(3))), 3);
        assert_eq!(coerce_int(Some(&json!("4"))), 4);
        assert_eq!(coerce_int(Some(&json!(2.9))), 2);
        assert_eq!(coerce_int(Some(&json!(-1))), 0);
        assert_eq!(coerce_int(Some(&json!({}))), 0);
        assert_eq!(coerce_optional_int(Some(&json!(-1))), None);
        assert_eq!(coerce_optional_int(Some(&json!(null))), None);
        assert_eq!(coerce_optional_int(Some(&json!(0))), Some(0));
    }

    #[test]
    fn test_collections_from_wrong_types_are_empty() {
        for raw in [None, Some(json!(null)), Some(json!("x")), Some(json!({"a": 1})), Some(json!([1, "two", null]))] {
            assert!(coerce_citations(raw.as_ref()).is_empty());
            assert!(coerce_citation_groups(raw.as_ref()).is_empty());
            assert!(coerce_claims(raw.as_ref()).is_empty());
            assert!(coerce_highlight_claims(raw.as_ref()).is_empty());
        }
        assert!(coerce_summary(Some(&json!([]))).is_none());
        assert!(coerce_summary(Some(&json!({}))).is_none());
    }

    #[test]
    fn test_citations_require_both_ids() {
        let raw = json!([
            {"chunk_id": Uuid::nil().to_string(), "source_id": "not-a-uuid"},
            {"chunk_id": Uuid::nil().to_string(), "source_id": Uuid::nil().to_string(),
             "source_title": 5, "snippet": null, "page_start": "2", "snippet_start": -3}
        ]);
        let citations = coerce_citations(Some(&raw));
        assert_eq!(citations.len(), 1);
        assert!(citations[0].source_title.is_none());
        assert_eq!(citations[0].snippet, "");
        assert_eq!(citations[0].page_start, Some(2));
        assert!(citations[0].snippet_start.is_none());
    }

    #[test]
    fn test_claims_default_verdict_and_scores() {
        let raw = json!([{"claim_text": "A.", "verdict": "weird", "support_score": "x"}, "junk"]);
        let claims = coerce_claims(Some(&raw));
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].verdict, Verdict::Unsupported);
        assert_eq!(claims[0].support_score, 0.0);

        let raw = json!([{"verdict": "supported"}]);
        let claims = coerce_claims(Some(&raw));
        assert_eq!(claims[0].verdict, Verdict::Supported);
        assert_eq!(claims[0].claim_text, "");
    }

    #[test]
    fn test_highlight_evidence_validation() {
        let id = Uuid::new_v4().to_string();
        let raw = json!([{
            "claim_text": "A.",
            "verdict": "SUPPORTED",
            "evidence": [
                {"chunk_id": id, "relation": "supports", "snippet": "s",
                 "highlight_start": 5, "highlight_end": 2, "highlight_text": "x"},
                {"chunk_id": id, "relation": "RELATED",
                 "highlight_start": 1, "highlight_end": 4, "highlight_text": "abc"},
                {"chunk_id": id, "relation": "UNRELATED"},
                {"relation": "SUPPORTS"}
            ]
        }]);
        let claims = coerce_highlight_claims(Some(&raw));
        let evidence = &claims[0].evidence;
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].relation, EvidenceRelation::Supports);
        assert!(evidence[0].highlight_start.is_none());
        assert!(evidence[0].highlight_text.is_none());
        assert_eq!(evidence[1].highlight_text.as_deref(), Some("abc"));
        assert_eq!(evidence[1].snippet, "");
    }

    #[test]
    fn test_coerce_summary() {
        let raw = json!({
            "supported_count": "2",
            "contradicted_count": -1,
            "has_contradictions": "yes",
            "overall_verdict": "ok",
            "answer_style": "bogus"
        });
        let summary = coerce_summary(Some(&raw)).unwrap();
        assert_eq!(summary.counts.supported, 2);
        assert_eq!(summary.counts.contradicted, 0);
        assert!(summary.has_contradictions.is_none());
        assert_eq!(summary.overall_verdict, Some(OverallVerdict::Ok));
        assert!(summary.answer_style.is_none());
    }
}
