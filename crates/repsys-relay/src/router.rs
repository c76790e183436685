use axum::{routing::get, Router};

use crate::ops::{self, OpsState};

pub fn build_router(state: OpsState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
