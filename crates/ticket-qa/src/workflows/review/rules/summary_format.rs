//! Short description format rule.
//!
//! The short description must decompose into exactly four hyphen-delimited
//! segments: `[Business Unit] - [Location] - [System] - [Brief Description]`.
//! Scoring maps the count of correct segments through a fixed descending
//! table, never linear interpolation: 4 correct earns the maximum, then 75%,
//! 50%, 25%, 0.

use super::super::domain::Ticket;
use super::super::verdict::{AwardedValue, CriterionVerdict};
use super::truncate;

const CRITERION: &str = "summary_format";

/// Recognized business-unit codes.
const BUSINESS_UNITS: &[&str] = &["CORP", "FIN", "HR", "OPS", "ENG", "LEGAL", "SALES"];

/// Well-known system and application names. Membership is a fast path; any
/// reasonable-length name is accepted.
const KNOWN_SYSTEMS: &[&str] = &[
    "VPN", "VDI", "LAN", "AD", "OUTLOOK", "TEAMS", "SHAREPOINT", "ONEDRIVE", "EMAIL", "LAPTOP",
    "DESKTOP", "MOBILE", "PRINTER", "NETWORK", "SAP", "WORKDAY", "CONCUR", "ZOOM", "MFA", "SSO",
    "CITRIX", "SERVICENOW",
];

/// Generic phrases that do not count as a brief description.
const GENERIC_BRIEFS: &[&str] = &[
    "issue",
    "problem",
    "not working",
    "help",
    "error",
    "broken",
    "urgent",
    "please help",
];

pub(super) fn evaluate(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    let short_desc = ticket.short_description.trim();

    if short_desc.is_empty() {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Points(0),
            "Empty short description",
            "Short description is empty or missing",
            Some(format_coaching(&[
                "Missing business unit",
                "Missing location",
                "Missing system",
                "Missing brief description",
            ])),
        );
    }

    let segments = split_segments(short_desc);
    let issues = check_segments(&segments, ticket);
    let correct = 4usize.saturating_sub(issues.len());
    let points = score_for(correct, max_points);

    if issues.is_empty() {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Points(points),
            format!("\"{}\"", truncate(short_desc, 160)),
            format!(
                "All 4 segments present and correctly formatted: unit={}, location={}, system={}, brief={}",
                segments[0].as_deref().unwrap_or("-"),
                segments[1].as_deref().unwrap_or("-"),
                segments[2].as_deref().unwrap_or("-"),
                segments[3].as_deref().unwrap_or("-"),
            ),
            None,
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Points(points),
        format!("\"{}\"", truncate(short_desc, 160)),
        format!("Issues found: {}", issues.join("; ")),
        Some(format_coaching(&issues)),
    )
}

/// Fixed descending score table keyed by correct-segment count.
fn score_for(correct: usize, max_points: u16) -> u16 {
    match correct {
        4 => max_points,
        3 => max_points * 3 / 4,
        2 => max_points / 2,
        1 => max_points / 4,
        _ => 0,
    }
}

/// Splits on " - " first, bare "-" as a fallback; segments past the fourth
/// belong to the brief description.
fn split_segments(short_desc: &str) -> [Option<String>; 4] {
    let raw: Vec<&str> = if short_desc.contains(" - ") {
        short_desc.split(" - ").collect()
    } else if short_desc.contains('-') {
        short_desc.split('-').collect()
    } else {
        return [None, None, None, Some(short_desc.trim().to_string())];
    };

    let mut segments: [Option<String>; 4] = [None, None, None, None];
    for slot in 0..3 {
        segments[slot] = raw
            .get(slot)
            .map(|segment| segment.trim().to_string())
            .filter(|segment| !segment.is_empty());
    }
    if raw.len() >= 4 {
        let brief = raw[3..].join(" - ").trim().to_string();
        segments[3] = Some(brief).filter(|segment| !segment.is_empty());
    }

    segments
}

fn check_segments(segments: &[Option<String>; 4], ticket: &Ticket) -> Vec<String> {
    let mut issues = Vec::new();

    match &segments[0] {
        None => issues.push("Missing business unit".to_string()),
        Some(unit) if !is_valid_unit(unit, ticket) => {
            issues.push(format!("Unrecognized business unit: '{unit}'"))
        }
        _ => {}
    }

    match &segments[1] {
        None => issues.push("Missing location".to_string()),
        Some(location) if !is_valid_location(location) => {
            issues.push(format!("Invalid location: '{location}'"))
        }
        _ => {}
    }

    match &segments[2] {
        None => issues.push("Missing system".to_string()),
        Some(system) if !is_valid_system(system) => {
            issues.push(format!("Invalid system: '{system}'"))
        }
        _ => {}
    }

    match &segments[3] {
        None => issues.push("Missing brief description".to_string()),
        Some(brief) => {
            if brief.chars().count() < 3 {
                issues.push(format!("Brief description too short: '{brief}'"));
            } else if brief.split_whitespace().count() > 8 {
                issues.push("Brief description exceeds 8 words".to_string());
            } else if GENERIC_BRIEFS.contains(&brief.to_ascii_lowercase().trim()) {
                issues.push(format!("Brief description is a generic phrase: '{brief}'"));
            }
        }
    }

    issues
}

/// Exact vocabulary match wins; the ticket's own business unit field is the
/// only accepted fallback.
fn is_valid_unit(unit: &str, ticket: &Ticket) -> bool {
    let upper = unit.to_ascii_uppercase();
    if BUSINESS_UNITS.contains(&upper.as_str()) {
        return true;
    }
    !ticket.business_unit.is_empty() && upper == ticket.business_unit.to_ascii_uppercase()
}

/// A bare place name: letters and spaces, leading capital, at least two chars.
fn is_valid_location(location: &str) -> bool {
    if location.chars().count() < 2 {
        return false;
    }
    let mut chars = location.chars();
    let leading_upper = chars.next().is_some_and(|first| first.is_uppercase());
    leading_upper
        && location
            .chars()
            .all(|character| character.is_alphabetic() || character == ' ')
}

fn is_valid_system(system: &str) -> bool {
    if KNOWN_SYSTEMS.contains(&system.to_ascii_uppercase().as_str()) {
        return true;
    }
    let length = system.chars().count();
    (1..=50).contains(&length)
}

fn format_coaching(issues: &[impl AsRef<str>]) -> String {
    let mut parts = vec![
        "Follow the 4-part format: [Business Unit] - [Location] - [System] - [Brief Description]"
            .to_string(),
    ];

    for issue in issues {
        let issue = issue.as_ref().to_ascii_lowercase();
        if issue.contains("business unit") {
            parts.push(format!(
                "Use a standard business unit code: {}",
                BUSINESS_UNITS.join(", ")
            ));
        } else if issue.contains("location") {
            parts.push("Include the office or city location".to_string());
        } else if issue.contains("system") {
            parts.push("Name the affected application or system (e.g., VPN, VDI, Outlook)".to_string());
        } else if issue.contains("brief") {
            parts.push("Close with a specific description of at most eight words".to_string());
        }
    }

    parts.dedup();
    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::review::domain::ContactChannel;

    fn ticket(short_description: &str) -> Ticket {
        Ticket {
            number: "TKT0001001".to_string(),
            category: "network".to_string(),
            subcategory: "vpn".to_string(),
            contact_channel: ContactChannel::Phone,
            priority: "3".to_string(),
            impact: "2".to_string(),
            urgency: "2".to_string(),
            business_unit: "CORP".to_string(),
            opened_for: None,
            short_description: short_description.to_string(),
            description: String::new(),
            work_notes: String::new(),
            close_notes: String::new(),
            close_code: String::new(),
            state: "2".to_string(),
            reassignment_count: 0,
            reopen_count: 0,
            opened_at: None,
            resolved_at: None,
            closed_at: None,
        }
    }

    #[test]
    fn four_correct_segments_earn_the_maximum() {
        let verdict = evaluate(&ticket("CORP - Chicago - VPN - cannot connect after update"), 8);
        assert_eq!(verdict.value, AwardedValue::Points(8));
        assert!(verdict.coaching.is_none());
    }

    #[test]
    fn three_of_four_segments_earn_exactly_three_quarters() {
        // Unrecognized business unit, everything else fine.
        let verdict = evaluate(&ticket("ACME - Chicago - VPN - cannot connect"), 8);
        assert_eq!(verdict.value, AwardedValue::Points(6));
        assert!(verdict.reasoning.contains("Unrecognized business unit"));
    }

    #[test]
    fn two_of_four_segments_earn_half() {
        let verdict = evaluate(&ticket("ACME - chicago - VPN - cannot connect"), 8);
        assert_eq!(verdict.value, AwardedValue::Points(4));
    }

    #[test]
    fn missing_separator_scores_one_of_four_at_best() {
        let verdict = evaluate(&ticket("vpn is broken for a user somewhere"), 8);
        // Only the brief-description slot is populated.
        assert_eq!(verdict.value, AwardedValue::Points(2));
    }

    #[test]
    fn empty_short_description_scores_zero() {
        let verdict = evaluate(&ticket("   "), 8);
        assert_eq!(verdict.value, AwardedValue::Points(0));
        assert!(verdict.evidence.contains("Empty"));
    }

    #[test]
    fn generic_brief_phrases_are_rejected() {
        let verdict = evaluate(&ticket("CORP - Chicago - VPN - issue"), 8);
        assert_eq!(verdict.value, AwardedValue::Points(6));
        assert!(verdict.reasoning.contains("generic phrase"));
    }

    #[test]
    fn long_briefs_are_rejected() {
        let verdict = evaluate(
            &ticket("CORP - Chicago - VPN - user cannot connect to the vpn from home today"),
            8,
        );
        assert_eq!(verdict.value, AwardedValue::Points(6));
        assert!(verdict.reasoning.contains("8 words"));
    }

    #[test]
    fn unit_matching_the_ticket_business_unit_is_accepted() {
        let mut ticket = ticket("RETAIL - Chicago - VPN - cannot connect");
        ticket.business_unit = "RETAIL".to_string();
        let verdict = evaluate(&ticket, 8);
        assert_eq!(verdict.value, AwardedValue::Points(8));
    }

    #[test]
    fn extra_segments_fold_into_the_brief() {
        let verdict = evaluate(&ticket("CORP - Chicago - VPN - cannot connect - after update"), 8);
        assert_eq!(verdict.value, AwardedValue::Points(8));
    }
}
