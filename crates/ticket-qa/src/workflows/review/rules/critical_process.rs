//! Critical process rule.
//!
//! Detects tickets that touch a critical process (password reset, lost or
//! stolen device, VIP support, virus/malware, data privacy, account lockout)
//! and verifies the mandated handling. A password-process violation emits the
//! FAIL sentinel — the auto-fail class zeroes the whole ticket — while other
//! violations cost a fixed 35-point deduction. Tickets with no critical
//! process are not applicable.

use super::super::domain::Ticket;
use super::super::verdict::{AwardedValue, CriterionVerdict};
use super::extract_evidence;

const CRITERION: &str = "critical_process";

const PROCESS_PENALTY: u16 = 35;

struct ProcessSpec {
    key: &'static str,
    name: &'static str,
    markers: &'static [&'static str],
    subcategory_markers: &'static [&'static str],
}

const PROCESSES: &[ProcessSpec] = &[
    ProcessSpec {
        key: "password_reset",
        name: "Password Reset",
        markers: &[
            "password reset",
            "reset password",
            "pwd reset",
            "network password",
            "account password",
        ],
        subcategory_markers: &["password"],
    },
    ProcessSpec {
        key: "lost_stolen",
        name: "Lost/Stolen Device",
        markers: &[
            "lost laptop",
            "stolen laptop",
            "lost device",
            "stolen device",
            "lost phone",
            "stolen phone",
            "missing laptop",
            "missing device",
        ],
        subcategory_markers: &["lost", "stolen"],
    },
    ProcessSpec {
        key: "vip",
        name: "VIP/Executive Support",
        markers: &["vip", "executive", "c-suite", "senior leadership"],
        subcategory_markers: &[],
    },
    ProcessSpec {
        key: "virus_malware",
        name: "Virus/Malware Incident",
        markers: &[
            "virus",
            "malware",
            "ransomware",
            "infected",
            "suspicious file",
            "suspicious email",
        ],
        subcategory_markers: &["virus", "malware"],
    },
    ProcessSpec {
        key: "data_privacy",
        name: "Data Privacy/Security Incident",
        markers: &[
            "data privacy",
            "security incident",
            "data breach",
            "unauthorized access",
            "pii exposure",
        ],
        subcategory_markers: &[],
    },
    ProcessSpec {
        key: "account_lockout",
        name: "Account Lockout",
        markers: &["account locked", "locked out", "account lockout", "account disabled"],
        subcategory_markers: &["lockout"],
    },
];

const TRUSTED_COLLEAGUE_MARKERS: &[&str] = &[
    "trusted colleague",
    "trusted contact",
    "manager",
    "supervisor",
];

const PASSWORD_DELIVERY_MARKERS: &[&str] = &[
    "temporary password",
    "password sent",
    "password shared",
    "password provided",
    "reset link",
];

const CHANGE_INSTRUCTION_MARKERS: &[&str] = &[
    "change the password",
    "change password",
    "update password",
    "change after first",
    "change it after",
];

const ESCALATION_MARKERS: &[&str] = &[
    "escalat",
    "security team",
    "infosec",
    "remote wipe",
    "device disabled",
    "account disabled",
    "device locked",
];

const SECURITY_ACTION_MARKERS: &[&str] = &[
    "escalat",
    "security team",
    "infosec",
    "isolated",
    "quarantine",
    "disconnected",
    "scan",
    "reported",
];

const PASSWORD_EVIDENCE_MARKERS: &[&str] = &[
    "password",
    "trusted",
    "manager",
    "colleague",
    "reset",
    "sent",
    "shared",
];

pub(super) fn evaluate(ticket: &Ticket) -> CriterionVerdict {
    let detected = detect_processes(ticket);

    if detected.is_empty() {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::NotApplicable,
            "No critical process indicators found",
            "Ticket does not involve a critical process",
            None,
        );
    }

    for process in &detected {
        let verdict = verify_compliance(ticket, process);
        if verdict.value != AwardedValue::Pass {
            return verdict;
        }
    }

    let names: Vec<&str> = detected.iter().map(|process| process.name).collect();
    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Pass,
        format!("Critical process(es): {}", names.join(", ")),
        "All critical process requirements were followed correctly",
        None,
    )
}

fn detect_processes(ticket: &Ticket) -> Vec<&'static ProcessSpec> {
    let text = ticket.combined_text().to_ascii_lowercase();
    let subcategory = ticket.subcategory.to_ascii_lowercase();

    PROCESSES
        .iter()
        .filter(|process| {
            process
                .subcategory_markers
                .iter()
                .any(|marker| subcategory.contains(marker))
                || process.markers.iter().any(|marker| text.contains(marker))
        })
        .collect()
}

fn verify_compliance(ticket: &Ticket, process: &ProcessSpec) -> CriterionVerdict {
    match process.key {
        "password_reset" => verify_password_reset(ticket),
        "vip" => verify_vip(ticket),
        "lost_stolen" => verify_security_response(ticket, process, ESCALATION_MARKERS),
        "virus_malware" | "data_privacy" => {
            verify_security_response(ticket, process, SECURITY_ACTION_MARKERS)
        }
        _ => verify_documentation(ticket, process),
    }
}

/// Password resets must route through a trusted colleague; a password that
/// may have gone straight to the affected user is the one violation that
/// zeroes the whole ticket.
fn verify_password_reset(ticket: &Ticket) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    let has_trusted = contains_any(&text, TRUSTED_COLLEAGUE_MARKERS);
    let has_delivery = contains_any(&text, PASSWORD_DELIVERY_MARKERS);
    let has_instruction = contains_any(&text, CHANGE_INSTRUCTION_MARKERS);

    let evidence = extract_evidence(&ticket.working_notes(), PASSWORD_EVIDENCE_MARKERS);

    if has_trusted && (has_delivery || has_instruction) {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Pass,
            evidence,
            "Password reset process followed: trusted colleague documented, secure delivery used",
            None,
        );
    }

    if has_trusted {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Pass,
            evidence,
            "Password reset with trusted colleague documented",
            Some("Also document the password change instruction given to the user.".to_string()),
        );
    }

    if has_delivery || has_instruction {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Fail,
            evidence,
            "Password reset without trusted colleague documentation - password may have been \
             sent directly to the affected user",
            Some(
                "Never send a password directly to the affected user. Route delivery through a \
                 trusted colleague such as the user's manager."
                    .to_string(),
            ),
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Fail,
        "No password reset process documentation found",
        "Password reset detected but no process documentation",
        Some(
            "Document the password reset process: trusted colleague delivery, never direct to \
             the affected user, and instruct the user to change the password."
                .to_string(),
        ),
    )
}

fn verify_vip(ticket: &Ticket) -> CriterionVerdict {
    if matches!(ticket.priority.trim(), "1" | "2") {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Pass,
            format!("VIP ticket with priority {}", ticket.priority),
            "VIP ticket handled with appropriate priority level",
            None,
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Deduction(PROCESS_PENALTY),
        format!("VIP ticket with priority {}", ticket.priority),
        format!(
            "VIP ticket should have priority 1/2, but has priority {}",
            ticket.priority
        ),
        Some("Set priority 1 or 2 for VIP/executive support tickets.".to_string()),
    )
}

fn verify_security_response(
    ticket: &Ticket,
    process: &ProcessSpec,
    markers: &[&str],
) -> CriterionVerdict {
    let text = ticket.working_notes().to_ascii_lowercase();

    if contains_any(&text, markers) {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Pass,
            format!("{} with security response documented", process.name),
            format!("{} handled with appropriate security measures", process.name),
            None,
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Deduction(PROCESS_PENALTY),
        format!("{} incident", process.name),
        format!(
            "{} requires a security response but none was documented",
            process.name
        ),
        Some(format!(
            "For a {}: isolate or disable what is affected, escalate to the security team, and \
             document every action taken.",
            process.name.to_ascii_lowercase()
        )),
    )
}

fn verify_documentation(ticket: &Ticket, process: &ProcessSpec) -> CriterionVerdict {
    if ticket.close_notes.trim().chars().count() > 20 {
        return CriterionVerdict::new(
            CRITERION,
            AwardedValue::Pass,
            format!("{} with resolution documented", process.name),
            format!("{} handled and documented", process.name),
            None,
        );
    }

    CriterionVerdict::new(
        CRITERION,
        AwardedValue::Deduction(PROCESS_PENALTY),
        format!("{} with minimal documentation", process.name),
        format!("{} requires detailed documentation", process.name),
        Some("Document all actions taken for critical processes.".to_string()),
    )
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::review::domain::ContactChannel;

    fn ticket(description: &str, subcategory: &str, priority: &str) -> Ticket {
        Ticket {
            number: "TKT0001001".to_string(),
            category: "inquiry".to_string(),
            subcategory: subcategory.to_string(),
            contact_channel: ContactChannel::Phone,
            priority: priority.to_string(),
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
    fn no_critical_process_is_not_applicable() {
        let verdict = evaluate(&ticket("Monitor flickers intermittently.", "monitor", "3"));
        assert_eq!(verdict.value, AwardedValue::NotApplicable);
    }

    #[test]
    fn compliant_password_reset_passes() {
        let verdict = evaluate(&ticket(
            "Password reset requested. Temporary password sent to the user's manager as trusted \
             colleague, user instructed to change password at first login.",
            "password reset",
            "3",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn password_sent_without_trusted_colleague_is_an_auto_fail_sentinel() {
        let verdict = evaluate(&ticket(
            "Password reset done, temporary password sent to the user over chat.",
            "password reset",
            "3",
        ));
        assert_eq!(verdict.value, AwardedValue::Fail);
        assert!(verdict.reasoning.contains("trusted colleague"));
    }

    #[test]
    fn undocumented_password_reset_is_an_auto_fail_sentinel() {
        let verdict = evaluate(&ticket("User asked for a password reset.", "password reset", "3"));
        assert_eq!(verdict.value, AwardedValue::Fail);
    }

    #[test]
    fn vip_with_low_priority_costs_the_fixed_process_deduction() {
        let verdict = evaluate(&ticket("VIP user reports laptop issue.", "laptop", "4"));
        assert_eq!(verdict.value, AwardedValue::Deduction(35));
    }

    #[test]
    fn vip_with_high_priority_passes() {
        let verdict = evaluate(&ticket("VIP user reports laptop issue.", "laptop", "1"));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn lost_device_without_escalation_is_deducted() {
        let verdict = evaluate(&ticket(
            "User reports a lost laptop on the train.",
            "hardware",
            "3",
        ));
        assert_eq!(verdict.value, AwardedValue::Deduction(35));
    }

    #[test]
    fn lost_device_with_security_response_passes() {
        let verdict = evaluate(&ticket(
            "User reports a lost laptop. Device disabled and escalated to the security team.",
            "hardware",
            "3",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn malware_with_quarantine_passes() {
        let verdict = evaluate(&ticket(
            "Suspicious file reported. Machine isolated and a full scan completed.",
            "virus",
            "2",
        ));
        assert_eq!(verdict.value, AwardedValue::Pass);
    }

    #[test]
    fn account_lockout_with_thin_close_notes_is_deducted() {
        let mut lockout = ticket("User locked out of the account.", "lockout", "3");
        lockout.close_notes = "unlocked".to_string();
        let verdict = evaluate(&lockout);
        assert_eq!(verdict.value, AwardedValue::Deduction(35));
    }
}
