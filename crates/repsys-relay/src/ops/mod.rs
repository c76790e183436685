//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 once shutdown has begun)
//! - `/metrics` : Prometheus text format

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::obs::RelayMetrics;

/// State shared by the ops handlers.
#[derive(Clone)]
pub struct OpsState {
    metrics: Arc<RelayMetrics>,
}

impl OpsState {
    pub fn new(metrics: Arc<RelayMetrics>) -> Self {
        Self { metrics }
    }
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<OpsState>) -> impl IntoResponse {
    if state.metrics.is_stopping() {
        (StatusCode::SERVICE_UNAVAILABLE, "stopping")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<OpsState>) -> Response {
    let body = state.metrics.render();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
