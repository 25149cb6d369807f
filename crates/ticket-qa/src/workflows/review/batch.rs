//! Batch orchestration over many tickets.
//!
//! Each ticket runs as its own task behind a semaphore so concurrency stays
//! bounded and a failure in one ticket is contained at that ticket's
//! boundary. Progress is reported through snapshots; the orchestrator owns
//! the only mutable state.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use super::assess::NarrativeBackend;
use super::domain::Ticket;
use super::evaluator::{EvaluationResult, TicketEvaluator};
use super::rubric::EvaluationTemplate;
use super::scoring::{round1, PerformanceBand};

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Snapshot of batch state handed to the progress callback. Never a live
/// reference; the callback cannot perturb the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    pub total: usize,
    pub completed: usize,
    pub errored: usize,
    pub current_ticket: Option<String>,
    pub percent_complete: f64,
    pub elapsed_seconds: f64,
    pub estimated_remaining_seconds: f64,
}

/// Cooperative cancellation handle. Cancellation takes effect between
/// tickets; in-flight evaluations finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A ticket whose evaluation escaped the evaluator, recorded instead of
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFailure {
    pub ticket_number: String,
    pub error: String,
}

/// Aggregate statistics over completed (non-errored) results only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub evaluated: usize,
    pub errored: usize,
    pub average_score: f64,
    pub average_percentage: f64,
    pub pass_rate: f64,
    pub band_distribution: BTreeMap<&'static str, usize>,
    pub common_issues: Vec<String>,
    pub duration_seconds: f64,
}

impl BatchSummary {
    fn empty() -> Self {
        Self {
            evaluated: 0,
            errored: 0,
            average_score: 0.0,
            average_percentage: 0.0,
            pass_rate: 0.0,
            band_distribution: empty_band_distribution(),
            common_issues: Vec::new(),
            duration_seconds: 0.0,
        }
    }
}

fn empty_band_distribution() -> BTreeMap<&'static str, usize> {
    PerformanceBand::all()
        .into_iter()
        .map(|band| (band.label(), 0))
        .collect()
}

/// Complete output of a batch run. Results come back in submission order.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<EvaluationResult>,
    pub errors: Vec<TicketFailure>,
    pub summary: BatchSummary,
    pub cancelled: bool,
}

enum TicketTask {
    Completed(Box<EvaluationResult>),
    Skipped,
}

/// Runs the single-ticket evaluator over many tickets with bounded
/// concurrency, progress snapshots, and per-ticket failure isolation.
pub struct BatchOrchestrator<B> {
    evaluator: Arc<TicketEvaluator<B>>,
    concurrency: usize,
}

impl<B: NarrativeBackend + Send + Sync + 'static> BatchOrchestrator<B> {
    pub fn new(evaluator: Arc<TicketEvaluator<B>>, concurrency: usize) -> Self {
        Self {
            evaluator,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn evaluate_batch(
        &self,
        tickets: Vec<Ticket>,
        template: Arc<EvaluationTemplate>,
        on_progress: impl Fn(BatchProgress),
        cancel: &CancellationFlag,
    ) -> BatchOutcome {
        let total = tickets.len();
        if total == 0 {
            return BatchOutcome {
                results: Vec::new(),
                errors: Vec::new(),
                summary: BatchSummary::empty(),
                cancelled: cancel.is_cancelled(),
            };
        }

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set: JoinSet<(usize, TicketTask)> = JoinSet::new();
        let mut task_index: HashMap<tokio::task::Id, (usize, String)> = HashMap::new();

        for (index, ticket) in tickets.into_iter().enumerate() {
            let number = ticket.number.clone();
            let evaluator = Arc::clone(&self.evaluator);
            let template = Arc::clone(&template);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            let handle = join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, TicketTask::Skipped),
                };
                if cancel.is_cancelled() {
                    return (index, TicketTask::Skipped);
                }
                let result = evaluator.evaluate(&ticket, &template).await;
                (index, TicketTask::Completed(Box::new(result)))
            });
            task_index.insert(handle.id(), (index, number));
        }

        let mut slots: Vec<Option<EvaluationResult>> = (0..total).map(|_| None).collect();
        let mut errors: Vec<(usize, TicketFailure)> = Vec::new();
        let mut completed = 0usize;
        let mut errored = 0usize;
        let mut skipped = 0usize;

        while let Some(joined) = join_set.join_next_with_id().await {
            let current_ticket = match joined {
                Ok((id, (index, TicketTask::Completed(result)))) => {
                    completed += 1;
                    slots[index] = Some(*result);
                    task_index.remove(&id).map(|(_, number)| number)
                }
                Ok((id, (_, TicketTask::Skipped))) => {
                    skipped += 1;
                    task_index.remove(&id);
                    continue;
                }
                Err(join_error) => {
                    let id = join_error.id();
                    let (index, number) = task_index
                        .remove(&id)
                        .unwrap_or((usize::MAX, "unknown".to_string()));
                    let reason = describe_join_error(join_error);
                    error!(ticket = %number, error = %reason, "ticket evaluation failed");
                    errored += 1;
                    errors.push((
                        index,
                        TicketFailure {
                            ticket_number: number.clone(),
                            error: reason,
                        },
                    ));
                    Some(number)
                }
            };

            let snapshot = BatchProgress {
                total,
                completed,
                errored,
                current_ticket,
                percent_complete: round1((completed + errored) as f64 / total as f64 * 100.0),
                elapsed_seconds: started.elapsed().as_secs_f64(),
                estimated_remaining_seconds: estimate_remaining(
                    started,
                    completed + errored,
                    total - skipped,
                ),
            };

            // A panicking callback must not take the batch down with it.
            if catch_unwind(AssertUnwindSafe(|| on_progress(snapshot))).is_err() {
                warn!("progress callback panicked; continuing batch");
            }
        }

        errors.sort_by_key(|(index, _)| *index);
        let errors: Vec<TicketFailure> = errors.into_iter().map(|(_, failure)| failure).collect();
        let results: Vec<EvaluationResult> = slots.into_iter().flatten().collect();

        let mut summary = summarize(&results, errored);
        summary.duration_seconds = round1(started.elapsed().as_secs_f64());

        BatchOutcome {
            results,
            errors,
            summary,
            cancelled: cancel.is_cancelled() || skipped > 0,
        }
    }
}

fn estimate_remaining(started: Instant, done: usize, total: usize) -> f64 {
    if done == 0 {
        return 0.0;
    }
    let average = started.elapsed().as_secs_f64() / done as f64;
    let remaining = total.saturating_sub(done);
    round1(average * remaining as f64)
}

fn describe_join_error(join_error: tokio::task::JoinError) -> String {
    if join_error.is_panic() {
        let payload = join_error.into_panic();
        if let Some(text) = payload.downcast_ref::<&str>() {
            format!("panic: {text}")
        } else if let Some(text) = payload.downcast_ref::<String>() {
            format!("panic: {text}")
        } else {
            "panic: evaluation task panicked".to_string()
        }
    } else {
        format!("task failed: {join_error}")
    }
}

fn summarize(results: &[EvaluationResult], errored: usize) -> BatchSummary {
    if results.is_empty() {
        let mut summary = BatchSummary::empty();
        summary.errored = errored;
        return summary;
    }

    let evaluated = results.len();
    let passed = results.iter().filter(|result| result.passed).count();
    let score_sum: f64 = results
        .iter()
        .map(|result| f64::from(result.total_score))
        .sum();
    let percentage_sum: f64 = results.iter().map(|result| result.percentage).sum();

    let mut band_distribution = empty_band_distribution();
    for result in results {
        *band_distribution.entry(result.band.label()).or_insert(0) += 1;
    }

    let mut issue_counts: HashMap<&str, usize> = HashMap::new();
    for result in results {
        for improvement in &result.improvements {
            let theme = improvement
                .split_once(": ")
                .map(|(prefix, _)| prefix)
                .unwrap_or(improvement.as_str());
            *issue_counts.entry(theme).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = issue_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let common_issues = ranked
        .into_iter()
        .take(5)
        .map(|(theme, _)| theme.to_string())
        .collect();

    BatchSummary {
        evaluated,
        errored,
        average_score: round1(score_sum / evaluated as f64),
        average_percentage: round1(percentage_sum / evaluated as f64),
        pass_rate: round1(passed as f64 / evaluated as f64 * 100.0),
        band_distribution,
        common_issues,
        duration_seconds: 0.0,
    }
}
