use crate::cli::ServeArgs;
use crate::infra::{AppState, ReviewContext};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use ticket_qa::config::AppConfig;
use ticket_qa::error::AppError;
use ticket_qa::telemetry;
use ticket_qa::workflows::review::{OpenAiChatClient, TicketEvaluator};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    config.assessor.require_api_key()?;
    let backend = Arc::new(
        OpenAiChatClient::new(config.assessor.clone())
            .map_err(|err| std::io::Error::other(err.to_string()))?,
    );
    let context = Arc::new(ReviewContext {
        evaluator: Arc::new(TicketEvaluator::new(backend)),
        concurrency: config.review.concurrency,
    });

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_review_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "ticket quality review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
