//! Caller validation documentation rule.
//!
//! Checks that the agent documented how the caller's identity was validated.
//! The requirement depends on the contact channel: phone and chat contacts
//! must document validation, e-mail from a verified domain and self-service
//! submissions do not.
//!
//! Outcomes: PASS (fully documented), a deduction for partial documentation,
//! FAIL when a channel that requires validation has none (the deduction
//! class's negative sentinel, costing the fixed penalty), or not-applicable.

use super::super::domain::{ContactChannel, Ticket};
use super::super::verdict::{AwardedValue, CriterionVerdict};
use super::extract_evidence;

const CRITERION: &str = "validation_performed";

/// Partial documentation costs less than the full fixed penalty would imply,
/// matching the rubric's "-15 incomplete" line item.
const PARTIAL_PENALTY: u16 = 15;

const MFA_MARKERS: &[&str] = &[
    "okta push",
    "mfa push",
    "mfa approved",
    "okta verified",
    "validated via okta",
    "validated by okta",
    "okta app",
    "mfa verified",
];

const GUEST_MARKERS: &[&str] = &[
    "guest chat",
    "guest validation",
    "chat validation",
    "guest verified",
];

const GENERAL_MARKERS: &[&str] = &[
    "validated",
    "validation",
    "verified",
    "identity check",
    "confirmed caller",
    "confirmed identity",
];

const EVIDENCE_MARKERS: &[&str] = &["validat", "verif", "okta", "mfa", "employee id", "confirm"];

const IDENTITY_ELEMENTS: &[(&str, &[&str])] = &[
    (
        "name",
        &["full name", "colleague name", "name verified", "name confirmed"],
    ),
    (
        "employee id",
        &["employee id", "emp id", "employee number", "id verified"],
    ),
    (
        "location",
        &[
            "office location",
            "workday location",
            "site location",
            "working from home",
            "working remotely",
            "location confirmed",
        ],
    ),
];

pub(super) fn evaluate(ticket: &Ticket) -> CriterionVerdict {
    match &ticket.contact_channel {
        ContactChannel::SelfService => not_required("self-service"),
        ContactChannel::Phone => evaluate_phone(ticket),
        ContactChannel::Chat => evaluate_chat(ticket),
        ContactChannel::Email => evaluate_email(ticket),
        ContactChannel::Other(raw) => evaluate_unknown(ticket, raw),
    }
}

fn evaluate_phone(ticket: &Ticket) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    if contains_any(&text, MFA_MARKERS) {
        return pass(ticket, "MFA push validation documented");
    }

    let elements = documented_elements(&text);
    if elements.len() >= 2 {
        return pass(
            ticket,
            &format!("Phone validation documented with: {}", elements.join(", ")),
        );
    }

    if elements.len() == 1 {
        let missing: Vec<&str> = IDENTITY_ELEMENTS
            .iter()
            .map(|(element, _)| *element)
            .filter(|element| element != &elements[0])
            .collect();
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Deduction(PARTIAL_PENALTY),
            evidence(ticket),
            format!("Incomplete validation: only {} documented", elements[0]),
            Some(format!(
                "Document additional validation elements: {}",
                missing.join(", ")
            )),
        );
    }

    if contains_any(&text, GENERAL_MARKERS) {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Deduction(PARTIAL_PENALTY),
            evidence(ticket),
            "Validation mentioned but details not documented",
            Some(
                "Document the specific validation method: MFA push, or employee id, full name, \
                 and office location"
                    .to_string(),
            ),
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Fail,
        "No validation documentation found in description or work notes",
        "Phone contact requires caller validation but none was documented",
        Some(
            "Always document caller validation: use MFA push or verify employee id, full name, \
             and office location"
                .to_string(),
        ),
    )
}

fn evaluate_chat(ticket: &Ticket) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    if contains_any(&text, MFA_MARKERS) {
        return pass(ticket, "MFA validation confirmed via chat");
    }
    if contains_any(&text, GUEST_MARKERS) {
        return pass(ticket, "Guest chat validation documented");
    }
    if documented_elements(&text).len() >= 2 {
        return pass(ticket, "Chat validation with identity verification documented");
    }

    if contains_any(&text, GENERAL_MARKERS) {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Deduction(PARTIAL_PENALTY),
            evidence(ticket),
            "Validation mentioned but not fully documented",
            Some("Specify the validation method used for the chat session.".to_string()),
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Fail,
        "No validation documentation found",
        "Chat contact requires validation but none was documented",
        Some("Document the validation method: MFA verification or guest chat validation.".to_string()),
    )
}

fn evaluate_email(ticket: &Ticket) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    if contains_any(&text, MFA_MARKERS) || contains_any(&text, GENERAL_MARKERS) {
        return pass(ticket, "Email contact with validation documented");
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::NotApplicable,
        "Email contact type",
        "Email from a verified domain - explicit validation not required",
        None,
    )
}

fn evaluate_unknown(ticket: &Ticket, channel: &str) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    if contains_any(&text, MFA_MARKERS) || documented_elements(&text).len() >= 2 {
        return pass(
            ticket,
            &format!("Identity validation documented for {channel} contact"),
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::NotApplicable,
        format!("Contact channel: {channel}"),
        format!("Unknown contact channel '{channel}' - validation not assessed"),
        None,
    )
}

fn not_required(channel: &str) -> CriterionVerdict {
    CriterionVerdict::new(
        CRITERION,
        AwardedValue::NotApplicable,
        format!("Contact channel: {channel}"),
        format!("Contact channel '{channel}' does not require caller validation"),
        None,
    )
}

fn pass(ticket: &Ticket, reasoning: &str) -> CriterionVerdict {
    CriterionVerdict::new(CRITERION, AwardedValue::Pass, evidence(ticket), reasoning, None)
}

fn evidence(ticket: &Ticket) -> String {
    extract_evidence(&ticket.working_notes(), EVIDENCE_MARKERS)
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

fn documented_elements(text: &str) -> Vec<&'static str> {
    IDENTITY_ELEMENTS
        .iter()
        .filter(|(_, markers)| contains_any(text, markers))
        .map(|(element, _)| *element)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(channel: ContactChannel, description: &str) -> Ticket {
        Ticket {
            number: "TKT0001001".to_string(),
            category: "network".to_string(),
            subcategory: "vpn".to_string(),
            contact_channel: channel,
            priority: "3".to_string(),
            impact: "2".to_string(),
            urgency: "2".to_string(),
            business_unit: "CORP".to_string(),
            opened_for: None,
            short_description: String::new(),
            description: description.to_string(),
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
    fn mfa_validation_on_phone_passes() {
        let verdict = evaluate(&ticket(
            ContactChannel::Phone,
            "Caller validated via okta push before troubleshooting.",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
        assert!(verdict.evidence.contains("okta push"));
    }

    #[test]
    fn two_identity_elements_on_phone_pass() {
        let verdict = evaluate(&ticket(
            ContactChannel::Phone,
            "Verified employee id 48213 and office location Chicago.",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn single_identity_element_costs_the_partial_deduction() {
        let verdict = evaluate(&ticket(
            ContactChannel::Phone,
            "Checked employee id then reset the profile.",
        ));
        assert_eq!(verdict.value, AwardedValue::Deduction(15));
        assert!(verdict.coaching.is_some());
    }

    #[test]
    fn undocumented_phone_validation_fails() {
        let verdict = evaluate(&ticket(
            ContactChannel::Phone,
            "User cannot connect to the VPN. Restarted the client.",
        ));
        assert_eq!(verdict.value, AwardedValue::Fail);
    }

    #[test]
    fn self_service_is_not_applicable() {
        let verdict = evaluate(&ticket(ContactChannel::SelfService, "Portal request."));
        assert_eq!(verdict.value, AwardedValue::NotApplicable);
    }

    #[test]
    fn guest_chat_validation_passes() {
        let verdict = evaluate(&ticket(
            ContactChannel::Chat,
            "Guest chat validation completed before assisting.",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn email_without_mention_is_not_applicable() {
        let verdict = evaluate(&ticket(ContactChannel::Email, "Mailbox is full."));
        assert_eq!(verdict.value, AwardedValue::NotApplicable);
    }
}
