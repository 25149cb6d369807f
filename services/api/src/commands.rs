use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use ticket_qa::config::AppConfig;
use ticket_qa::error::AppError;
use ticket_qa::telemetry;
use ticket_qa::workflows::review::{
    BatchOrchestrator, BatchProgress, CancellationFlag, EvaluationTemplate, OpenAiChatClient,
    TemplateKind, TicketCsvImporter, TicketEvaluator,
};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Path to the ticket CSV export
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Scoring template: incident-logging, incident-handling, or customer-service
    #[arg(long, default_value = "incident-logging")]
    pub(crate) template: String,
    /// Override the configured concurrency limit
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,
}

pub(crate) async fn run_review_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let kind = TemplateKind::parse(&args.template).ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unknown template '{}'", args.template),
        ))
    })?;
    let template = Arc::new(EvaluationTemplate::standard(kind)?);

    config.assessor.require_api_key()?;
    let backend = Arc::new(
        OpenAiChatClient::new(config.assessor.clone())
            .map_err(|err| std::io::Error::other(err.to_string()))?,
    );

    let tickets = TicketCsvImporter::from_path(&args.input)?;
    info!(count = tickets.len(), template = kind.label(), "starting batch review");

    let evaluator = Arc::new(TicketEvaluator::new(backend));
    let orchestrator = BatchOrchestrator::new(
        evaluator,
        args.concurrency.unwrap_or(config.review.concurrency),
    );

    let cancel = CancellationFlag::new();
    let outcome = orchestrator
        .evaluate_batch(
            tickets,
            template,
            |progress: BatchProgress| {
                info!(
                    completed = progress.completed,
                    errored = progress.errored,
                    total = progress.total,
                    percent = progress.percent_complete,
                    "batch progress"
                );
            },
            &cancel,
        )
        .await;

    let rendered = serde_json::to_string_pretty(&outcome)
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    println!("{rendered}");

    Ok(())
}
