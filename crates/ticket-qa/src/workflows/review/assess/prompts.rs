//! Prompt assembly for narrative criteria.
//!
//! Each request carries the relevant ticket fields, the criterion's rubric
//! text, and the required output schema.

use super::super::domain::Ticket;
use super::super::rubric::CriterionDefinition;
use super::client::ChatRequest;

pub(crate) fn build_request(ticket: &Ticket, definition: &CriterionDefinition) -> ChatRequest {
    let system = format!(
        "You are a quality reviewer for IT support tickets. Score the criterion \"{}\" \
         (maximum {} points) for the ticket provided by the user.\n\nRubric:\n{}\n\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"score\": <number or \"PASS\"/\"FAIL\"/\"N/A\">, \"evidence\": \"<quote from the ticket>\", \
         \"reasoning\": \"<why this score>\", \"coaching\": \"<improvement suggestion>\" or null}}",
        definition.name,
        definition.max_points,
        rubric_text(definition.key),
    );

    ChatRequest {
        system,
        user: ticket_context(ticket),
        schema_name: definition.key,
        max_points: definition.max_points,
    }
}

fn ticket_context(ticket: &Ticket) -> String {
    format!(
        "Ticket {number}\n\
         Category: {category} / {subcategory}\n\
         Contact channel: {channel}\n\
         Priority: {priority} (impact {impact}, urgency {urgency})\n\
         Business unit: {unit}\n\
         Short description: {short}\n\n\
         Description:\n{description}\n\n\
         Work notes:\n{work_notes}\n\n\
         Close notes:\n{close_notes}\n\
         Close code: {close_code}",
        number = ticket.number,
        category = ticket.category,
        subcategory = ticket.subcategory,
        channel = ticket.contact_channel.label(),
        priority = ticket.priority,
        impact = ticket.impact,
        urgency = ticket.urgency,
        unit = ticket.business_unit,
        short = ticket.short_description,
        description = ticket.description,
        work_notes = ticket.work_notes,
        close_notes = ticket.close_notes,
        close_code = ticket.close_code,
    )
}

fn rubric_text(key: &str) -> &'static str {
    match key {
        "correct_service" => {
            "Full points when the selected business service matches the reported issue; \
             half when a better service exists; zero when wrong or missing."
        }
        "correct_ci" => {
            "Full points when the configuration item names the affected system; half when a \
             more specific item exists; zero when wrong or missing."
        }
        "accurate_description" => {
            "Full points when the description documents the user's location, contact details, \
             the issue itself, and any troubleshooting performed, all in the correct fields. \
             Half for partial documentation. Zero when key details are missing."
        }
        "spelling_grammar" => {
            "Full points for clean spelling and grammar throughout; zero when errors impede \
             readability."
        }
        "troubleshooting_quality" => {
            "Full points when documented troubleshooting follows a logical progression \
             appropriate to the issue; half when steps are thin; zero when absent. Score N/A \
             when the issue required no troubleshooting."
        }
        "routing_resolving" => {
            "Full points when the ticket was resolved at first contact where possible or \
             routed to the correct team; zero when misrouted or a first-contact resolution \
             opportunity was missed."
        }
        "resolution_notes" => {
            "Full points when the close notes summarize the fix and record user confirmation; \
             half for partial notes; N/A when the ticket is still in progress or routed on."
        }
        "greeting" => "Full points for a professional greeting; zero when absent or curt.",
        "offer_workaround" => {
            "Full points when a workaround was offered where one plausibly existed; N/A when no \
             workaround applies."
        }
        "necessary_troubleshooting" => {
            "Full points when all troubleshooting performed was necessary and relevant; zero \
             for redundant or missing steps."
        }
        "self_resolve_training" => {
            "Full points when the agent showed the user how to resolve the issue themselves \
             next time, where applicable; N/A otherwise."
        }
        "resolution_follow_through" => {
            "Full points when the agent confirmed the resolution with the user before closing; \
             zero when the ticket was closed unconfirmed."
        }
        "closing_message" => {
            "Full points for a courteous closing message; zero when the conversation just stops."
        }
        "general_customer_service" => {
            "Full points for professional, empathetic service throughout the ticket; deduct \
             for dismissive or unclear communication."
        }
        _ => "Score against the criterion name using the ticket content as evidence.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::review::domain::ContactChannel;
    use crate::workflows::review::rubric::{EvaluationTemplate, TemplateKind};

    #[test]
    fn request_carries_schema_name_and_rubric() {
        let template =
            EvaluationTemplate::standard(TemplateKind::IncidentHandling).expect("template loads");
        let definition = template.criterion("resolution_notes").expect("criterion exists");
        let request = build_request(&ticket(), definition);

        assert_eq!(request.schema_name, "resolution_notes");
        assert_eq!(request.max_points, 15);
        assert!(request.system.contains("Resolution Notes"));
        assert!(request.system.contains("close notes"));
        assert!(request.user.contains("TKT0001001"));
        assert!(request.user.contains("VPN"));
    }

    fn ticket() -> Ticket {
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
            short_description: "CORP - Chicago - VPN - cannot connect".to_string(),
            description: "User cannot connect to the VPN.".to_string(),
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
}
