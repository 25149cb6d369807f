//! Single-ticket evaluation, the unit of work for the batch orchestrator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::assess::{NarrativeAssessor, NarrativeBackend};
use super::domain::Ticket;
use super::rubric::{
    CriterionDefinition, EvaluationSource, EvaluationTemplate, PolicyClass, TemplateKind,
};
use super::rules::RuleSet;
use super::scoring::{self, AppliedDeduction, AutoFailNotice, PerformanceBand};
use super::verdict::{AwardedValue, CriterionVerdict, VerdictProvenance};

/// Share of a criterion's maximum that counts as a strength.
const STRENGTH_THRESHOLD: f64 = 0.9;
const MAX_STRENGTHS: usize = 5;

/// Per-criterion view joined with its definition, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: String,
    pub criterion_name: String,
    pub max_points: u16,
    pub points_awarded: u16,
    pub value: AwardedValue,
    pub evidence: String,
    pub reasoning: String,
    pub coaching: Option<String>,
    pub provenance: VerdictProvenance,
}

/// Final output for one ticket.
///
/// Deliberately free of wall-clock fields: re-evaluating the same ticket with
/// the same rule and narrative inputs produces an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub ticket_number: String,
    pub template: TemplateKind,
    pub criterion_scores: Vec<CriterionScore>,
    pub total_score: u16,
    pub max_score: u16,
    pub percentage: f64,
    pub band: PerformanceBand,
    pub passed: bool,
    pub deductions: Vec<AppliedDeduction>,
    pub auto_fail: Option<AutoFailNotice>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Orchestrates the rule set, the narrative gateway, and the aggregator for
/// one ticket. Rule criteria never block on narrative criteria; narrative
/// criteria for the same ticket run concurrently.
pub struct TicketEvaluator<B> {
    rules: RuleSet,
    assessor: NarrativeAssessor<B>,
}

impl<B: NarrativeBackend> TicketEvaluator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            rules: RuleSet::new(),
            assessor: NarrativeAssessor::new(backend),
        }
    }

    pub async fn evaluate(&self, ticket: &Ticket, template: &EvaluationTemplate) -> EvaluationResult {
        let narrative_definitions: Vec<&CriterionDefinition> = template
            .criteria()
            .iter()
            .filter(|definition| definition.source == EvaluationSource::Narrative)
            .collect();

        let rule_verdicts: Vec<CriterionVerdict> = template
            .criteria()
            .iter()
            .filter(|definition| definition.source == EvaluationSource::Rule)
            .map(|definition| self.rules.evaluate(ticket, definition))
            .collect();

        let narrative_verdicts = self
            .assessor
            .assess_batch(ticket, &narrative_definitions)
            .await;

        // Completion order is not canonical order; restore the registry's
        // ordering before scoring and display.
        let mut verdicts: Vec<CriterionVerdict> = Vec::with_capacity(template.criteria().len());
        for definition in template.criteria() {
            let found = rule_verdicts
                .iter()
                .chain(narrative_verdicts.iter())
                .find(|verdict| verdict.criterion == definition.key);
            verdicts.push(match found {
                Some(verdict) => verdict.clone(),
                None => CriterionVerdict::error(definition.key, "no verdict produced"),
            });
        }

        let breakdown = scoring::aggregate(template, &verdicts);
        let criterion_scores = criterion_scores(template, &verdicts);
        let strengths = collect_strengths(template, &verdicts);
        let improvements = collect_improvements(template, &criterion_scores, &breakdown.deductions,
            breakdown.auto_fail.as_ref());

        EvaluationResult {
            ticket_number: ticket.number.clone(),
            template: template.kind(),
            criterion_scores,
            total_score: breakdown.total_score,
            max_score: breakdown.max_score,
            percentage: breakdown.percentage,
            band: breakdown.band,
            passed: breakdown.passed,
            deductions: breakdown.deductions,
            auto_fail: breakdown.auto_fail,
            strengths,
            improvements,
        }
    }
}

fn criterion_scores(
    template: &EvaluationTemplate,
    verdicts: &[CriterionVerdict],
) -> Vec<CriterionScore> {
    verdicts
        .iter()
        .filter_map(|verdict| {
            let definition = template.criterion(&verdict.criterion)?;
            Some(CriterionScore {
                criterion_id: verdict.criterion.clone(),
                criterion_name: definition.name.to_string(),
                max_points: definition.max_points,
                points_awarded: verdict.value.points_toward(definition.max_points),
                value: verdict.value,
                evidence: verdict.evidence.clone(),
                reasoning: verdict.reasoning.clone(),
                coaching: verdict.coaching.clone(),
                provenance: verdict.provenance,
            })
        })
        .collect()
}

fn collect_strengths(template: &EvaluationTemplate, verdicts: &[CriterionVerdict]) -> Vec<String> {
    let mut strengths = Vec::new();

    for verdict in verdicts {
        let Some(definition) = template.criterion(&verdict.criterion) else {
            continue;
        };

        match definition.policy {
            PolicyClass::Additive => {
                if definition.max_points == 0 {
                    continue;
                }
                let awarded = verdict.value.points_toward(definition.max_points);
                let share = f64::from(awarded) / f64::from(definition.max_points);
                if share >= STRENGTH_THRESHOLD {
                    strengths.push(format!("{}: {}", definition.name, verdict.reasoning));
                }
            }
            PolicyClass::Deduction { .. } | PolicyClass::AutoFail => {
                if verdict.value == AwardedValue::Pass {
                    strengths.push(format!("{}: process followed correctly", definition.name));
                }
            }
        }
    }

    strengths.truncate(MAX_STRENGTHS);
    strengths
}

/// Improvement items carry the points recoverable by fixing them and come
/// back sorted by that figure, descending — the path to the biggest score
/// recovery first. Registry order breaks ties.
fn collect_improvements(
    template: &EvaluationTemplate,
    criterion_scores: &[CriterionScore],
    deductions: &[AppliedDeduction],
    auto_fail: Option<&AutoFailNotice>,
) -> Vec<String> {
    let mut entries: Vec<(u16, usize, String)> = Vec::new();

    if let Some(notice) = auto_fail {
        let name = template
            .criterion(&notice.criterion)
            .map(|definition| definition.name)
            .unwrap_or(notice.criterion.as_str());
        entries.push((
            template.max_score(),
            0,
            format!("{name}: process failure - requires immediate attention"),
        ));
    }

    for deduction in deductions {
        let Some(definition) = template.criterion(&deduction.criterion) else {
            continue;
        };
        let coaching = criterion_scores
            .iter()
            .find(|score| score.criterion_id == deduction.criterion)
            .and_then(|score| score.coaching.clone())
            .unwrap_or_else(|| "follow the documented process".to_string());
        entries.push((
            deduction.amount,
            position(template, &deduction.criterion),
            format!("{}: {}", definition.name, coaching),
        ));
    }

    for score in criterion_scores {
        let Some(definition) = template.criterion(&score.criterion_id) else {
            continue;
        };
        if definition.policy != PolicyClass::Additive || definition.max_points == 0 {
            continue;
        }

        let recoverable = definition.max_points.saturating_sub(score.points_awarded);
        if recoverable == 0 {
            continue;
        }

        let detail = score.coaching.clone().unwrap_or_else(|| {
            format!(
                "scored {}/{} - {}",
                score.points_awarded, definition.max_points, score.reasoning
            )
        });
        entries.push((
            recoverable,
            position(template, &score.criterion_id),
            format!("{}: {}", definition.name, detail),
        ));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    entries.into_iter().map(|(_, _, text)| text).collect()
}

fn position(template: &EvaluationTemplate, key: &str) -> usize {
    template
        .criteria()
        .iter()
        .position(|definition| definition.key == key)
        .unwrap_or(usize::MAX)
}
