//! HTTP surface.
//!
//! Routes:
//! - `GET /mean` and `GET /mean/` run an aggregation job
//! - `GET /health` liveness check

mod handlers;

pub use handlers::MeanQuery;

use crate::analysis::Aggregator;
use axum::routing::get;
use axum::Router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/mean", get(handlers::mean))
        .route("/mean/", get(handlers::mean))
        .with_state(state)
}
