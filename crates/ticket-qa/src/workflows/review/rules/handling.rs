//! Structural handling rules: priority matrix, interaction-vs-incident
//! classification, and resolution code completeness.

use super::super::domain::{ContactChannel, Ticket};
use super::super::verdict::{AwardedValue, CriterionVerdict};

const PRIORITY_CRITERION: &str = "correct_priority";
const INTERACTION_CRITERION: &str = "interaction_vs_incident";
const RESOLUTION_CODE_CRITERION: &str = "resolution_code";

/// Phrases that mark a ticket as a how-to conversation rather than a fault.
const INTERACTION_MARKERS: &[&str] = &[
    "how do i",
    "how to",
    "quick question",
    "where can i find",
    "general question",
];

const KNOWN_CLOSE_CODES: &[&str] = &[
    "solved (permanently)",
    "solved (work around)",
    "solved remotely",
    "not solved",
    "closed/resolved by caller",
    "advice given",
    "duplicate",
];

/// Priority must match the standard impact x urgency matrix.
pub(super) fn evaluate_priority(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    let Some(expected) = expected_priority(&ticket.impact, &ticket.urgency) else {
        return CriterionVerdict::new(
            PRIORITY_CRITERION,
            AwardedValue::NotApplicable,
            format!("impact={}, urgency={}", ticket.impact, ticket.urgency),
            "Impact or urgency is missing, priority cannot be derived",
            None,
        );
    };

    if ticket.priority.trim() == expected {
        return CriterionVerdict::new(
            PRIORITY_CRITERION,
            AwardedValue::Points(max_points),
            format!(
                "impact={}, urgency={}, priority={}",
                ticket.impact, ticket.urgency, ticket.priority
            ),
            format!("Priority {} matches the impact/urgency matrix", ticket.priority),
            None,
        );
    }

    CriterionVerdict::new(
        PRIORITY_CRITERION,
        AwardedValue::Points(0),
        format!(
            "impact={}, urgency={}, priority={}",
            ticket.impact, ticket.urgency, ticket.priority
        ),
        format!(
            "Priority {} does not match the matrix value {} for impact {} / urgency {}",
            ticket.priority, expected, ticket.impact, ticket.urgency
        ),
        Some(format!(
            "Set priority {expected} for impact {} with urgency {}.",
            ticket.impact, ticket.urgency
        )),
    )
}

fn expected_priority(impact: &str, urgency: &str) -> Option<&'static str> {
    let impact: u8 = impact.trim().parse().ok().filter(|value| (1..=3).contains(value))?;
    let urgency: u8 = urgency.trim().parse().ok().filter(|value| (1..=3).contains(value))?;

    Some(match impact + urgency {
        2 => "1",
        3 => "2",
        4 => "3",
        5 => "4",
        _ => "5",
    })
}

/// Incidents describe a fault; how-to conversations belong in an interaction
/// record instead.
pub(super) fn evaluate_interaction(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    let text = format!(
        "{}\n{}",
        ticket.short_description, ticket.description
    )
    .to_ascii_lowercase();

    let reads_like_interaction = INTERACTION_MARKERS
        .iter()
        .any(|marker| text.contains(marker));
    let live_channel = matches!(
        ticket.contact_channel,
        ContactChannel::Phone | ContactChannel::Chat
    );

    if reads_like_interaction && live_channel && ticket.reopen_count == 0 {
        return CriterionVerdict::new(
            INTERACTION_CRITERION,
            AwardedValue::Points(0),
            first_line(&ticket.description),
            "Logged as an incident but reads as a how-to interaction",
            Some(
                "Record how-to conversations as interactions; reserve incidents for service \
                 faults."
                    .to_string(),
            ),
        );
    }

    CriterionVerdict::new(
        INTERACTION_CRITERION,
        AwardedValue::Points(max_points),
        first_line(&ticket.description),
        "Ticket type matches the reported content",
        None,
    )
}

/// Resolved tickets must carry a recognized close code.
pub(super) fn evaluate_resolution_code(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    if !ticket.is_resolved() {
        return CriterionVerdict::new(
            RESOLUTION_CODE_CRITERION,
            AwardedValue::NotApplicable,
            format!("state: {}", ticket.state),
            "Ticket is not yet resolved, close code not required",
            None,
        );
    }

    let code = ticket.close_code.trim();
    if code.is_empty() {
        return CriterionVerdict::new(
            RESOLUTION_CODE_CRITERION,
            AwardedValue::Points(0),
            "Close code field is empty",
            "Resolved ticket has no close code",
            Some("Select the close code that matches the resolution.".to_string()),
        );
    }

    if KNOWN_CLOSE_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return CriterionVerdict::new(
            RESOLUTION_CODE_CRITERION,
            AwardedValue::Points(max_points),
            format!("close code: {code}"),
            "Close code is from the standard set",
            None,
        );
    }

    CriterionVerdict::new(
        RESOLUTION_CODE_CRITERION,
        AwardedValue::Points(max_points / 2),
        format!("close code: {code}"),
        format!("'{code}' is not a standard close code"),
        Some("Use one of the standard close codes.".to_string()),
    )
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
