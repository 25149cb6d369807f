use serde::{Deserialize, Serialize};

use super::rubric::{EvaluationTemplate, PolicyClass};
use super::verdict::{AwardedValue, CriterionVerdict};

/// Pass threshold, fixed across templates.
pub const PASS_THRESHOLD: f64 = 90.0;

/// Coarse performance category derived from the percentage score.
///
/// Boundaries are inclusive at the lower edge of each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Top,
    Pass,
    Borderline,
    Below,
    Critical,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 95.0 {
            Self::Top
        } else if percentage >= 90.0 {
            Self::Pass
        } else if percentage >= 75.0 {
            Self::Borderline
        } else if percentage >= 50.0 {
            Self::Below
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PerformanceBand::Top => "top",
            PerformanceBand::Pass => "pass",
            PerformanceBand::Borderline => "borderline",
            PerformanceBand::Below => "below",
            PerformanceBand::Critical => "critical",
        }
    }

    pub const fn all() -> [PerformanceBand; 5] {
        [
            PerformanceBand::Top,
            PerformanceBand::Pass,
            PerformanceBand::Borderline,
            PerformanceBand::Below,
            PerformanceBand::Critical,
        ]
    }
}

/// One deduction applied during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDeduction {
    pub criterion: String,
    pub amount: u16,
}

/// Record of an auto-fail override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFailNotice {
    pub criterion: String,
    pub reason: String,
}

/// Output of score aggregation for one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Additive sum before deductions, never clamped.
    pub base_score: i32,
    /// Final score clamped to `[0, max_score]`.
    pub total_score: u16,
    pub max_score: u16,
    pub percentage: f64,
    pub band: PerformanceBand,
    pub passed: bool,
    pub deductions: Vec<AppliedDeduction>,
    pub auto_fail: Option<AutoFailNotice>,
}

/// Folds the verdict list into a final banded score.
///
/// Additive verdicts sum to the base score; deduction-class verdicts subtract
/// (FAIL sentinel costs the registry-defined fixed penalty, custom magnitudes
/// cost exactly themselves); an auto-fail sentinel overrides the final score
/// to zero after everything else; the result is clamped to `[0, max]`.
pub fn aggregate(template: &EvaluationTemplate, verdicts: &[CriterionVerdict]) -> ScoreBreakdown {
    let mut base_score: i32 = 0;
    let mut deductions: Vec<AppliedDeduction> = Vec::new();
    let mut auto_fail: Option<AutoFailNotice> = None;

    for verdict in verdicts {
        let Some(definition) = template.criterion(&verdict.criterion) else {
            continue;
        };

        match definition.policy {
            PolicyClass::Additive => {
                base_score += i32::from(verdict.value.points_toward(definition.max_points));
            }
            PolicyClass::Deduction { penalty } => match verdict.value {
                AwardedValue::Fail => deductions.push(AppliedDeduction {
                    criterion: verdict.criterion.clone(),
                    amount: penalty,
                }),
                AwardedValue::Deduction(amount) => deductions.push(AppliedDeduction {
                    criterion: verdict.criterion.clone(),
                    amount,
                }),
                _ => {}
            },
            PolicyClass::AutoFail => match verdict.value {
                AwardedValue::Fail => {
                    if auto_fail.is_none() {
                        auto_fail = Some(AutoFailNotice {
                            criterion: verdict.criterion.clone(),
                            reason: verdict.reasoning.clone(),
                        });
                    }
                }
                AwardedValue::Deduction(amount) => deductions.push(AppliedDeduction {
                    criterion: verdict.criterion.clone(),
                    amount,
                }),
                _ => {}
            },
        }
    }

    let deducted: i32 = deductions.iter().map(|entry| i32::from(entry.amount)).sum();
    let mut total = base_score - deducted;

    // Hard override, computed last: base contributions become irrelevant.
    if auto_fail.is_some() {
        total = 0;
    }

    let max_score = template.max_score();
    let total_score = total.clamp(0, i32::from(max_score)) as u16;

    let percentage = round1(f64::from(total_score) / f64::from(max_score) * 100.0);
    let band = PerformanceBand::from_percentage(percentage);
    let passed = percentage >= PASS_THRESHOLD;

    ScoreBreakdown {
        base_score,
        total_score,
        max_score,
        percentage,
        band,
        passed,
        deductions,
        auto_fail,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::review::rubric::TemplateKind;
    use crate::workflows::review::verdict::CriterionVerdict;

    fn template() -> EvaluationTemplate {
        EvaluationTemplate::standard(TemplateKind::IncidentHandling).expect("template loads")
    }

    fn points(criterion: &str, value: u16) -> CriterionVerdict {
        CriterionVerdict::new(criterion, AwardedValue::Points(value), "", "scored", None)
    }

    fn full_marks() -> Vec<CriterionVerdict> {
        vec![
            CriterionVerdict::new("critical_process", AwardedValue::NotApplicable, "", "", None),
            CriterionVerdict::new("validation_performed", AwardedValue::Pass, "", "", None),
            points("correct_priority", 5),
            points("troubleshooting_quality", 20),
            points("interaction_vs_incident", 5),
            points("routing_resolving", 20),
            points("resolution_code", 5),
            points("resolution_notes", 15),
        ]
    }

    #[test]
    fn full_marks_reach_the_template_maximum() {
        let breakdown = aggregate(&template(), &full_marks());
        assert_eq!(breakdown.total_score, 70);
        assert_eq!(breakdown.percentage, 100.0);
        assert_eq!(breakdown.band, PerformanceBand::Top);
        assert!(breakdown.passed);
        assert!(breakdown.deductions.is_empty());
        assert!(breakdown.auto_fail.is_none());
    }

    #[test]
    fn deduction_sentinel_subtracts_the_fixed_penalty() {
        let mut verdicts = full_marks();
        verdicts[1] =
            CriterionVerdict::new("validation_performed", AwardedValue::Fail, "", "none", None);
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 55);
        assert_eq!(breakdown.deductions.len(), 1);
        assert_eq!(breakdown.deductions[0].amount, 15);
    }

    #[test]
    fn custom_deduction_magnitude_subtracts_exactly_itself() {
        let mut verdicts = full_marks();
        verdicts[0] = CriterionVerdict::new(
            "critical_process",
            AwardedValue::Deduction(35),
            "",
            "vip priority wrong",
            None,
        );
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 35);
        assert_eq!(breakdown.deductions[0].amount, 35);
        assert!(breakdown.auto_fail.is_none());
    }

    #[test]
    fn auto_fail_sentinel_zeroes_the_score_regardless_of_other_verdicts() {
        let mut verdicts = full_marks();
        verdicts[0] = CriterionVerdict::new(
            "critical_process",
            AwardedValue::Fail,
            "",
            "password sent to affected user",
            None,
        );
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 0);
        assert_eq!(breakdown.percentage, 0.0);
        assert_eq!(breakdown.band, PerformanceBand::Critical);
        assert!(!breakdown.passed);
        let notice = breakdown.auto_fail.expect("auto fail recorded");
        assert_eq!(notice.criterion, "critical_process");
    }

    #[test]
    fn score_never_goes_negative_or_above_the_maximum() {
        let mut verdicts = full_marks();
        // Strip the additive points and stack deductions.
        for verdict in verdicts.iter_mut().skip(2) {
            verdict.value = AwardedValue::Points(0);
        }
        verdicts[1] = CriterionVerdict::new(
            "validation_performed",
            AwardedValue::Deduction(50),
            "",
            "",
            None,
        );
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 0);
        assert!(breakdown.base_score >= 0);

        let inflated: Vec<CriterionVerdict> = full_marks()
            .into_iter()
            .map(|mut verdict| {
                if let AwardedValue::Points(_) = verdict.value {
                    verdict.value = AwardedValue::Points(u16::MAX);
                }
                verdict
            })
            .collect();
        let breakdown = aggregate(&template(), &inflated);
        assert_eq!(breakdown.total_score, 70);
    }

    #[test]
    fn band_boundaries_are_inclusive_at_the_lower_edge() {
        assert_eq!(PerformanceBand::from_percentage(95.0), PerformanceBand::Top);
        assert_eq!(PerformanceBand::from_percentage(94.9), PerformanceBand::Pass);
        assert_eq!(PerformanceBand::from_percentage(90.0), PerformanceBand::Pass);
        assert_eq!(
            PerformanceBand::from_percentage(89.9),
            PerformanceBand::Borderline
        );
        assert_eq!(
            PerformanceBand::from_percentage(75.0),
            PerformanceBand::Borderline
        );
        assert_eq!(PerformanceBand::from_percentage(74.9), PerformanceBand::Below);
        assert_eq!(PerformanceBand::from_percentage(50.0), PerformanceBand::Below);
        assert_eq!(
            PerformanceBand::from_percentage(49.9),
            PerformanceBand::Critical
        );
    }

    #[test]
    fn passed_tracks_the_ninety_percent_threshold() {
        let mut verdicts = full_marks();
        verdicts[7] = points("resolution_notes", 8);
        // 63/70 = 90.0%
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 63);
        assert_eq!(breakdown.percentage, 90.0);
        assert!(breakdown.passed);
        assert_eq!(breakdown.band, PerformanceBand::Pass);

        verdicts[7] = points("resolution_notes", 7);
        // 62/70 = 88.6%
        let breakdown = aggregate(&template(), &verdicts);
        assert!(!breakdown.passed);
        assert_eq!(breakdown.band, PerformanceBand::Borderline);
    }

    #[test]
    fn unknown_criteria_are_ignored() {
        let mut verdicts = full_marks();
        verdicts.push(points("not_a_criterion", 50));
        let breakdown = aggregate(&template(), &verdicts);
        assert_eq!(breakdown.total_score, 70);
    }
}
