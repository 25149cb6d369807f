use std::io::Cursor;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ticket_qa::workflows::review::{
    BatchOrchestrator, BatchOutcome, CancellationFlag, EvaluationTemplate, NarrativeBackend,
    TemplateKind, Ticket, TicketCsvImporter,
};

use crate::infra::{AppState, ReviewContext};

#[derive(Debug, Deserialize)]
pub(crate) struct BatchReviewRequest {
    pub(crate) template: String,
    #[serde(default)]
    pub(crate) tickets: Vec<Ticket>,
    /// Raw CSV export, accepted as an alternative to inline tickets.
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default)]
    pub(crate) concurrency: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchReviewResponse {
    pub(crate) template: TemplateKind,
    #[serde(flatten)]
    pub(crate) outcome: BatchOutcome,
}

pub(crate) fn with_review_routes<B>(context: Arc<ReviewContext<B>>) -> Router
where
    B: NarrativeBackend + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/api/v1/review/batch",
            axum::routing::post(batch_review_endpoint::<B>),
        )
        .with_state(context)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn batch_review_endpoint<B>(
    State(context): State<Arc<ReviewContext<B>>>,
    Json(payload): Json<BatchReviewRequest>,
) -> axum::response::Response
where
    B: NarrativeBackend + Send + Sync + 'static,
{
    let Some(kind) = TemplateKind::parse(&payload.template) else {
        let body = json!({ "error": format!("unknown template '{}'", payload.template) });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let template = match EvaluationTemplate::standard(kind) {
        Ok(template) => Arc::new(template),
        Err(err) => {
            let body = json!({ "error": err.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    let mut tickets = payload.tickets;
    if let Some(csv) = payload.csv {
        match TicketCsvImporter::from_reader(Cursor::new(csv.into_bytes())) {
            Ok(parsed) => tickets.extend(parsed),
            Err(err) => {
                let body = json!({ "error": err.to_string() });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        }
    }

    let orchestrator = BatchOrchestrator::new(
        Arc::clone(&context.evaluator),
        payload.concurrency.unwrap_or(context.concurrency),
    );
    let cancel = CancellationFlag::new();
    let outcome = orchestrator
        .evaluate_batch(tickets, template, |_progress| {}, &cancel)
        .await;

    (
        StatusCode::OK,
        Json(BatchReviewResponse {
            template: kind,
            outcome,
        }),
    )
        .into_response()
}
