//! Ticket CSV ingestion.
//!
//! Parses a support-ticket CSV export into typed [`Ticket`] records. Rows
//! without a ticket number are skipped; everything else is normalized
//! forgivingly so a sparse export still evaluates.

mod parser;

use std::io::Read;
use std::path::Path;

use super::domain::Ticket;

#[derive(Debug)]
pub enum TicketImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for TicketImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketImportError::Io(err) => write!(f, "failed to read ticket export: {}", err),
            TicketImportError::Csv(err) => write!(f, "invalid ticket CSV data: {}", err),
        }
    }
}

impl std::error::Error for TicketImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TicketImportError::Io(err) => Some(err),
            TicketImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TicketImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TicketImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct TicketCsvImporter;

impl TicketCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Ticket>, TicketImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Ticket>, TicketImportError> {
        Ok(parser::parse_tickets(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::review::domain::ContactChannel;
    use std::io::Cursor;

    const HEADER: &str = "number,opened_at,resolved_at,closed_at,category,subcategory,contact_type,priority,impact,urgency,business_unit,opened_for,short_description,description,work_notes,close_notes,close_code,state,reassignment_count,reopen_count\n";

    #[test]
    fn well_formed_row_maps_to_a_ticket() {
        let csv = format!(
            "{HEADER}TKT0001001,2025-03-01 09:15:00,2025-03-01 10:00:00,,network,vpn,phone,3,2,2,CORP,emp-1,CORP - Chicago - VPN - cannot connect,User cannot connect.,Validated via okta push.,Restarted adapter.,Solved (Permanently),6,1,0\n"
        );
        let tickets = TicketCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(tickets.len(), 1);

        let ticket = &tickets[0];
        assert_eq!(ticket.number, "TKT0001001");
        assert_eq!(ticket.contact_channel, ContactChannel::Phone);
        assert_eq!(ticket.reassignment_count, 1);
        assert!(ticket.resolved_at.is_some());
        assert!(ticket.closed_at.is_none());
        assert_eq!(ticket.close_code, "Solved (Permanently)");
    }

    #[test]
    fn rows_without_a_ticket_number_are_skipped() {
        let csv = format!(
            "{HEADER},2025-03-01 09:15:00,,,network,vpn,phone,3,2,2,CORP,,short,desc,,,,2,0,0\nTKT0001002,2025-03-01 09:20:00,,,network,vpn,chat,3,2,2,CORP,,short,desc,,,,2,0,0\n"
        );
        let tickets = TicketCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].number, "TKT0001002");
    }

    #[test]
    fn sparse_optional_fields_do_not_fail_the_row() {
        let csv = format!(
            "{HEADER}TKT0001003,not-a-date,,,network,vpn,email,3,,,CORP,,short,desc,,,,2,,\n"
        );
        let tickets = TicketCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        let ticket = &tickets[0];
        assert!(ticket.opened_at.is_none());
        assert_eq!(ticket.impact, "");
        assert_eq!(ticket.reopen_count, 0);
    }

    #[test]
    fn missing_files_surface_io_errors() {
        let error =
            TicketCsvImporter::from_path("./does-not-exist.csv").expect_err("expected io error");
        match error {
            TicketImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
