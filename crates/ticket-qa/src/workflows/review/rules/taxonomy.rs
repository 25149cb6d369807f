//! Category and subcategory taxonomy rule.
//!
//! Membership checks against the fixed classification taxonomy. Scores follow
//! a descending table: known selection earns the maximum, a near miss (alias,
//! or a subcategory that belongs elsewhere) earns half, unknown earns zero.

use super::super::domain::Ticket;
use super::super::verdict::{AwardedValue, CriterionVerdict};

const CATEGORY_CRITERION: &str = "correct_category";
const SUBCATEGORY_CRITERION: &str = "correct_subcategory";

const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "software",
        &[
            "installation",
            "configuration",
            "update",
            "error",
            "performance",
            "access",
            "license",
        ],
    ),
    (
        "hardware",
        &[
            "laptop",
            "desktop",
            "monitor",
            "keyboard",
            "printer",
            "docking station",
            "mobile device",
            "replacement",
        ],
    ),
    (
        "inquiry",
        &[
            "password reset",
            "account access",
            "general",
            "how to",
            "request",
            "status",
        ],
    ),
    (
        "network",
        &["connectivity", "vpn", "wifi", "wired", "dns", "firewall"],
    ),
    (
        "email",
        &["outlook", "access", "configuration", "calendar", "sync", "spam"],
    ),
    (
        "security",
        &[
            "virus",
            "malware",
            "phishing",
            "account lockout",
            "mfa",
            "suspicious activity",
        ],
    ),
    (
        "access",
        &[
            "account",
            "permissions",
            "shared drive",
            "application",
            "new user",
            "termination",
        ],
    ),
    (
        "telephony",
        &["desk phone", "softphone", "voicemail", "conference", "headset"],
    ),
];

const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("hw", "hardware"),
    ("sw", "software"),
    ("net", "network"),
    ("nw", "network"),
    ("sec", "security"),
];

pub(super) fn evaluate_category(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    let category = ticket.category.trim().to_ascii_lowercase();

    if category.is_empty() {
        return CriterionVerdict::new(
            CATEGORY_CRITERION,
            AwardedValue::Points(0),
            "Category field is empty",
            "No category selected",
            Some("Select the category that matches the reported issue.".to_string()),
        );
    }

    if subcategories_of(&category).is_some() {
        return CriterionVerdict::new(
            CATEGORY_CRITERION,
            AwardedValue::Points(max_points),
            format!("category: {}", ticket.category),
            format!("'{category}' is a recognized category"),
            None,
        );
    }

    if let Some(canonical) = resolve_alias(&category) {
        return CriterionVerdict::new(
            CATEGORY_CRITERION,
            AwardedValue::Points(max_points / 2),
            format!("category: {}", ticket.category),
            format!("'{category}' is shorthand for '{canonical}'; use the full category name"),
            Some(format!("Select '{canonical}' instead of the '{category}' shorthand.")),
        );
    }

    CriterionVerdict::new(
        CATEGORY_CRITERION,
        AwardedValue::Points(0),
        format!("category: {}", ticket.category),
        format!("'{category}' is not in the classification taxonomy"),
        Some("Select a category from the standard taxonomy.".to_string()),
    )
}

pub(super) fn evaluate_subcategory(ticket: &Ticket, max_points: u16) -> CriterionVerdict {
    let category = canonical_category(&ticket.category);
    let subcategory = ticket.subcategory.trim().to_ascii_lowercase();

    if subcategory.is_empty() {
        return CriterionVerdict::new(
            SUBCATEGORY_CRITERION,
            AwardedValue::Points(0),
            "Subcategory field is empty",
            "No subcategory selected",
            Some("Select the subcategory that narrows the reported issue.".to_string()),
        );
    }

    let listed_under_category = category
        .as_deref()
        .and_then(subcategories_of)
        .is_some_and(|options| options.iter().any(|option| *option == subcategory));

    if listed_under_category {
        return CriterionVerdict::new(
            SUBCATEGORY_CRITERION,
            AwardedValue::Points(max_points),
            format!("{} / {}", ticket.category, ticket.subcategory),
            format!(
                "'{subcategory}' is a recognized subcategory of '{}'",
                category.as_deref().unwrap_or("-")
            ),
            None,
        );
    }

    let listed_elsewhere = TAXONOMY
        .iter()
        .any(|(_, options)| options.iter().any(|option| *option == subcategory));

    if listed_elsewhere {
        return CriterionVerdict::new(
            SUBCATEGORY_CRITERION,
            AwardedValue::Points(max_points / 2),
            format!("{} / {}", ticket.category, ticket.subcategory),
            format!("'{subcategory}' exists in the taxonomy but under a different category"),
            Some("Re-check the category/subcategory pairing.".to_string()),
        );
    }

    CriterionVerdict::new(
        SUBCATEGORY_CRITERION,
        AwardedValue::Points(0),
        format!("{} / {}", ticket.category, ticket.subcategory),
        format!("'{subcategory}' is not in the classification taxonomy"),
        Some("Select a subcategory from the standard taxonomy.".to_string()),
    )
}

fn subcategories_of(category: &str) -> Option<&'static [&'static str]> {
    TAXONOMY
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, options)| *options)
}

fn resolve_alias(category: &str) -> Option<&'static str> {
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == category)
        .map(|(_, canonical)| *canonical)
}

fn canonical_category(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_ascii_lowercase();
    if subcategories_of(&lowered).is_some() {
        return Some(lowered);
    }
    resolve_alias(&lowered).map(|canonical| canonical.to_string())
}
