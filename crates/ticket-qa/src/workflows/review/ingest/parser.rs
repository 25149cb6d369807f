use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::{ContactChannel, Ticket};

pub(crate) fn parse_tickets<R: Read>(reader: R) -> Result<Vec<Ticket>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut tickets = Vec::new();

    for record in csv_reader.deserialize::<TicketRow>() {
        let row = record?;
        if row.number.trim().is_empty() {
            continue;
        }
        tickets.push(row.into_ticket());
    }

    Ok(tickets)
}

#[derive(Debug, Deserialize)]
struct TicketRow {
    #[serde(default)]
    number: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    opened_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resolved_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    closed_at: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    contact_type: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    impact: String,
    #[serde(default)]
    urgency: String,
    #[serde(default)]
    business_unit: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    opened_for: Option<String>,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    work_notes: String,
    #[serde(default)]
    close_notes: String,
    #[serde(default)]
    close_code: String,
    #[serde(default)]
    state: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reassignment_count: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reopen_count: Option<String>,
}

impl TicketRow {
    fn into_ticket(self) -> Ticket {
        Ticket {
            number: self.number.trim().to_string(),
            category: self.category,
            subcategory: self.subcategory,
            contact_channel: ContactChannel::from_raw(&self.contact_type),
            priority: self.priority,
            impact: self.impact,
            urgency: self.urgency,
            business_unit: self.business_unit,
            opened_for: self.opened_for,
            short_description: self.short_description,
            description: self.description,
            work_notes: self.work_notes,
            close_notes: self.close_notes,
            close_code: self.close_code,
            state: self.state,
            reassignment_count: parse_count(self.reassignment_count.as_deref()),
            reopen_count: parse_count(self.reopen_count.as_deref()),
            opened_at: self.opened_at.as_deref().and_then(parse_datetime),
            resolved_at: self.resolved_at.as_deref().and_then(parse_datetime),
            closed_at: self.closed_at.as_deref().and_then(parse_datetime),
        }
    }
}

fn parse_count(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_parsing_accepts_export_and_iso_formats() {
        assert!(parse_datetime("2025-03-01 09:15:00").is_some());
        assert!(parse_datetime("2025-03-01T09:15:00Z").is_some());
        assert!(parse_datetime("2025-03-01").is_some());
        assert!(parse_datetime("  ").is_none());
        assert!(parse_datetime("not-a-date").is_none());
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("3")), 3);
        assert_eq!(parse_count(Some("many")), 0);
    }
}
