//! Ticket quality review workflow.
//!
//! The pipeline evaluates one ticket at a time: deterministic rules and
//! narrative assessments each produce [`verdict::CriterionVerdict`] values,
//! the aggregator folds them into a banded score, and the batch orchestrator
//! runs the whole thing over many tickets with bounded concurrency and
//! per-ticket failure isolation.

pub mod assess;
pub mod batch;
pub mod domain;
pub mod evaluator;
pub mod ingest;
pub mod rubric;
pub mod rules;
pub mod scoring;
pub mod verdict;

pub use assess::{AssessError, ChatRequest, NarrativeAssessor, NarrativeBackend, OpenAiChatClient};
pub use batch::{
    BatchOrchestrator, BatchOutcome, BatchProgress, BatchSummary, CancellationFlag, TicketFailure,
};
pub use domain::{ContactChannel, Ticket};
pub use evaluator::{CriterionScore, EvaluationResult, TicketEvaluator};
pub use ingest::{TicketCsvImporter, TicketImportError};
pub use rubric::{
    CriterionDefinition, EvaluationSource, EvaluationTemplate, PolicyClass, TemplateError,
    TemplateKind,
};
pub use scoring::{AppliedDeduction, AutoFailNotice, PerformanceBand, ScoreBreakdown};
pub use verdict::{AwardedValue, CriterionVerdict, VerdictProvenance};
