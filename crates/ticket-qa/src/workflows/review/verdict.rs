use serde::{Deserialize, Serialize};

/// Outcome value for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardedValue {
    /// Bounded numeric points toward an additive criterion.
    Points(u16),
    Pass,
    Fail,
    NotApplicable,
    /// Explicit deduction magnitude, stored positive.
    Deduction(u16),
}

impl AwardedValue {
    /// Points this value contributes toward an additive criterion's maximum.
    ///
    /// PASS and not-applicable award the full maximum; FAIL and deductions
    /// award nothing.
    pub fn points_toward(self, max_points: u16) -> u16 {
        match self {
            AwardedValue::Points(points) => points.min(max_points),
            AwardedValue::Pass | AwardedValue::NotApplicable => max_points,
            AwardedValue::Fail | AwardedValue::Deduction(_) => 0,
        }
    }
}

/// Confidence tag carried by every verdict.
///
/// `Degraded` marks partially recovered narrative responses; `Failed` marks a
/// zero-score verdict produced because evaluation itself failed, which must
/// stay distinguishable from a genuine zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictProvenance {
    Complete,
    Degraded,
    Failed,
}

impl VerdictProvenance {
    pub const fn label(self) -> &'static str {
        match self {
            VerdictProvenance::Complete => "complete",
            VerdictProvenance::Degraded => "degraded",
            VerdictProvenance::Failed => "failed",
        }
    }
}

/// Atomic unit of evaluation, identical in shape regardless of whether a
/// deterministic rule or the narrative gateway produced it. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionVerdict {
    pub criterion: String,
    pub value: AwardedValue,
    pub evidence: String,
    pub reasoning: String,
    pub coaching: Option<String>,
    pub provenance: VerdictProvenance,
}

impl CriterionVerdict {
    pub fn new(
        criterion: &str,
        value: AwardedValue,
        evidence: impl Into<String>,
        reasoning: impl Into<String>,
        coaching: Option<String>,
    ) -> Self {
        Self {
            criterion: criterion.to_string(),
            value,
            evidence: evidence.into(),
            reasoning: reasoning.into(),
            coaching,
            provenance: VerdictProvenance::Complete,
        }
    }

    pub fn degraded(mut self) -> Self {
        self.provenance = VerdictProvenance::Degraded;
        self
    }

    /// Zero-score verdict recording an evaluation failure.
    pub fn error(criterion: &str, detail: &str) -> Self {
        Self {
            criterion: criterion.to_string(),
            value: AwardedValue::Points(0),
            evidence: format!("evaluation error: {detail}"),
            reasoning: "criterion could not be evaluated".to_string(),
            coaching: Some("Review this criterion manually.".to_string()),
            provenance: VerdictProvenance::Failed,
        }
    }

    pub fn is_error(&self) -> bool {
        self.provenance == VerdictProvenance::Failed
    }
}
