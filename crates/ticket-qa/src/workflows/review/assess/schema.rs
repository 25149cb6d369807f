//! Response schema handling with permissive partial recovery.
//!
//! The backend is asked for `{score, evidence, reasoning, coaching}`. A
//! response matching the schema yields a complete verdict. Anything else goes
//! through partial-field recovery: accept whatever subset of the expected
//! fields is present and default the rest. A recovered verdict is tagged
//! degraded; a response missing the score, or carrying fewer than two of the
//! expected fields, becomes an explicit error verdict instead of a fake
//! partial success.

use serde_json::Value;

use super::super::rubric::CriterionDefinition;
use super::super::verdict::{AwardedValue, CriterionVerdict};

/// Minimum recovered fields (of score/evidence/reasoning) for a partial
/// response to count at all.
const MIN_RECOVERED_FIELDS: usize = 2;

pub(crate) fn verdict_from_response(
    definition: &CriterionDefinition,
    response: &Value,
) -> CriterionVerdict {
    let score = response.get("score").and_then(|raw| parse_score(raw, definition.max_points));
    let evidence = response.get("evidence").and_then(parse_text);
    let reasoning = response.get("reasoning").and_then(parse_text);
    let coaching = response
        .get("coaching")
        .and_then(parse_text)
        .filter(|text| !text.is_empty());

    let recovered = [
        score.is_some(),
        evidence.is_some(),
        reasoning.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    let Some(value) = score else {
        return CriterionVerdict::error(definition.key, "response did not contain a usable score");
    };
    if recovered < MIN_RECOVERED_FIELDS {
        return CriterionVerdict::error(
            definition.key,
            "response recovered too few fields to be trusted",
        );
    }

    let complete = evidence.is_some() && reasoning.is_some();
    let verdict = CriterionVerdict::new(
        definition.key,
        value,
        evidence.unwrap_or_default(),
        reasoning.unwrap_or_else(|| "No reasoning provided".to_string()),
        coaching,
    );

    if complete {
        verdict
    } else {
        verdict.degraded()
    }
}

/// Accepts numeric scores, the PASS/FAIL/N-A sentinels, and signed deduction
/// amounts, as either JSON numbers or strings.
fn parse_score(raw: &Value, max_points: u16) -> Option<AwardedValue> {
    if let Some(number) = raw.as_i64() {
        return Some(score_from_number(number, max_points));
    }
    if let Some(number) = raw.as_f64() {
        return Some(score_from_number(number.round() as i64, max_points));
    }

    let text = raw.as_str()?.trim().to_ascii_uppercase();
    match text.as_str() {
        "PASS" => Some(AwardedValue::Pass),
        "FAIL" => Some(AwardedValue::Fail),
        "N/A" | "NA" | "NOT APPLICABLE" => Some(AwardedValue::NotApplicable),
        other => other
            .parse::<i64>()
            .ok()
            .map(|number| score_from_number(number, max_points)),
    }
}

fn score_from_number(number: i64, max_points: u16) -> AwardedValue {
    if number < 0 {
        let magnitude = number.unsigned_abs().min(u64::from(u16::MAX)) as u16;
        AwardedValue::Deduction(magnitude)
    } else {
        let points = (number as u64).min(u64::from(max_points)) as u16;
        AwardedValue::Points(points)
    }
}

/// Evidence may come back as a string or an array of quotes.
fn parse_text(raw: &Value) -> Option<String> {
    if let Some(text) = raw.as_str() {
        return Some(text.trim().to_string());
    }
    if let Some(items) = raw.as_array() {
        let joined: Vec<&str> = items.iter().filter_map(|item| item.as_str()).collect();
        if joined.is_empty() {
            return None;
        }
        return Some(joined.join("; "));
    }
    None
}
