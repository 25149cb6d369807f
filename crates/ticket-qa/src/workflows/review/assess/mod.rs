//! Narrative assessment gateway.
//!
//! Wraps the external text-judgment capability behind [`NarrativeBackend`]
//! and converts its structured responses into [`CriterionVerdict`] values.
//! Every failure mode — retries exhausted, malformed response, partial
//! recovery below the completeness threshold — degrades to an explicitly
//! flagged zero-score verdict; the assessor never raises to the caller.

mod client;
mod prompts;
mod schema;

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::warn;

use super::domain::Ticket;
use super::rubric::CriterionDefinition;
use super::verdict::CriterionVerdict;

pub use client::{AssessError, ChatRequest, NarrativeBackend, OpenAiChatClient, TokenUsage};

/// Issues one structured request per criterion and maps every outcome, good
/// or bad, to a verdict.
pub struct NarrativeAssessor<B> {
    backend: Arc<B>,
}

impl<B> Clone for NarrativeAssessor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: NarrativeBackend> NarrativeAssessor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn assess(
        &self,
        ticket: &Ticket,
        definition: &CriterionDefinition,
    ) -> CriterionVerdict {
        let request = prompts::build_request(ticket, definition);

        match self.backend.complete(&request).await {
            Ok(response) => schema::verdict_from_response(definition, &response),
            Err(err) => {
                warn!(
                    ticket = %ticket.number,
                    criterion = definition.key,
                    error = %err,
                    "narrative assessment failed, recording error verdict"
                );
                CriterionVerdict::error(definition.key, &err.to_string())
            }
        }
    }

    /// Assesses several criteria for the same ticket concurrently. Verdicts
    /// come back in the order the definitions were given, regardless of
    /// completion order.
    pub async fn assess_batch(
        &self,
        ticket: &Ticket,
        definitions: &[&CriterionDefinition],
    ) -> Vec<CriterionVerdict> {
        join_all(
            definitions
                .iter()
                .map(|definition| self.assess(ticket, definition)),
        )
        .await
    }
}
