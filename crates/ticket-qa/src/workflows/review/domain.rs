use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Contact channel the ticket was raised through.
///
/// Validation requirements differ per channel, so the enum keeps unknown
/// channels around as text instead of collapsing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Phone,
    Chat,
    Email,
    SelfService,
    Other(String),
}

impl ContactChannel {
    pub fn from_raw(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "phone" | "call" => Self::Phone,
            "chat" => Self::Chat,
            "email" => Self::Email,
            "self-service" | "self_service" | "web" | "portal" => Self::SelfService,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ContactChannel::Phone => "phone",
            ContactChannel::Chat => "chat",
            ContactChannel::Email => "email",
            ContactChannel::SelfService => "self-service",
            ContactChannel::Other(raw) => raw.as_str(),
        }
    }
}

/// Parsed support incident record, read-only input to every evaluation
/// component.
///
/// Optional fields may be absent without failing the ticket; criteria that
/// depend on them simply run out of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub number: String,
    pub category: String,
    pub subcategory: String,
    pub contact_channel: ContactChannel,
    pub priority: String,
    pub impact: String,
    pub urgency: String,
    pub business_unit: String,
    #[serde(default)]
    pub opened_for: Option<String>,
    pub short_description: String,
    pub description: String,
    #[serde(default)]
    pub work_notes: String,
    #[serde(default)]
    pub close_notes: String,
    #[serde(default)]
    pub close_code: String,
    pub state: String,
    #[serde(default)]
    pub reassignment_count: u32,
    #[serde(default)]
    pub reopen_count: u32,
    #[serde(default)]
    pub opened_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub resolved_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
}

impl Ticket {
    /// All free-text fields joined for keyword scanning.
    pub fn combined_text(&self) -> String {
        [
            self.short_description.as_str(),
            self.description.as_str(),
            self.work_notes.as_str(),
            self.close_notes.as_str(),
        ]
        .join("\n")
    }

    /// Description plus worknotes, the fields agents document process steps in.
    pub fn working_notes(&self) -> String {
        [
            self.description.as_str(),
            self.work_notes.as_str(),
            self.close_notes.as_str(),
        ]
        .join("\n")
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some() || matches!(self.state.trim(), "6" | "7")
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some() || self.state.trim() == "7"
    }
}
