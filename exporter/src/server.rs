use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use flow_core::prelude::DelegatedShutdownListener;
use flow_instruments::{MetricAggregator, MetricsExposition, OPENMETRICS_CONTENT_TYPE};
use serde::Serialize;
use tokio::net::TcpListener;

#[derive(Clone)]
struct ScrapeState {
    exposition: Arc<MetricsExposition>,
}

/// Routes for the scrape endpoint. The handlers only ever see snapshots of the aggregate.
pub fn router(aggregator: Arc<MetricAggregator>) -> Router {
    let state = ScrapeState {
        exposition: Arc::new(MetricsExposition::new(aggregator)),
    };

    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the scrape endpoint on `listener` until the shutdown listener fires.
pub async fn serve(
    listener: TcpListener,
    aggregator: Arc<MetricAggregator>,
    mut shutdown_listener: DelegatedShutdownListener,
) -> std::io::Result<()> {
    log::info!(
        "Metrics available at http://{}/metrics",
        listener.local_addr()?
    );

    axum::serve(listener, router(aggregator))
        .with_graceful_shutdown(async move { shutdown_listener.wait_for_shutdown().await })
        .await
}

async fn metrics(State(state): State<ScrapeState>) -> Response {
    match state.exposition.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            log::error!("Failed to encode metrics: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
