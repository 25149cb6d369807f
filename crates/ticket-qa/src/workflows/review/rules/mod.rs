//! Deterministic criterion rules.
//!
//! Every rule is a pure function over the ticket: no external calls, no
//! retries, no failure mode that escapes. A criterion the rule set does not
//! recognize still yields a verdict — a flagged zero-score error — so one
//! malformed definition can never abort a ticket's evaluation.

mod critical_process;
mod handling;
mod summary_format;
mod taxonomy;
mod validation;

use super::domain::Ticket;
use super::rubric::CriterionDefinition;
use super::verdict::CriterionVerdict;

/// Dispatcher mapping rule-sourced criteria to their implementations.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSet;

impl RuleSet {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, ticket: &Ticket, definition: &CriterionDefinition) -> CriterionVerdict {
        match definition.key {
            "summary_format" => summary_format::evaluate(ticket, definition.max_points),
            "correct_category" => taxonomy::evaluate_category(ticket, definition.max_points),
            "correct_subcategory" => taxonomy::evaluate_subcategory(ticket, definition.max_points),
            "validation_performed" => validation::evaluate(ticket),
            "critical_process" => critical_process::evaluate(ticket),
            "correct_priority" => handling::evaluate_priority(ticket, definition.max_points),
            "interaction_vs_incident" => {
                handling::evaluate_interaction(ticket, definition.max_points)
            }
            "resolution_code" => handling::evaluate_resolution_code(ticket, definition.max_points),
            other => CriterionVerdict::error(other, "no deterministic rule registered"),
        }
    }
}

/// Lines of free text that mention any of the given markers, joined for use
/// as verdict evidence. Falls back to the first line when nothing matches.
pub(crate) fn extract_evidence(text: &str, markers: &[&str]) -> String {
    let mut matched: Vec<&str> = Vec::new();
    for line in text.lines() {
        let lowered = line.to_ascii_lowercase();
        if markers.iter().any(|marker| lowered.contains(marker)) {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                matched.push(trimmed);
            }
        }
        if matched.len() == 2 {
            break;
        }
    }

    let evidence = if matched.is_empty() {
        text.lines().next().unwrap_or("").trim().to_string()
    } else {
        matched.join(" | ")
    };

    truncate(&evidence, 200)
}

pub(crate) fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let cut: String = value.chars().take(limit.saturating_sub(3)).collect();
    format!("{cut}...")
}
