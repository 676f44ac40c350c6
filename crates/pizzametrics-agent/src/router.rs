//! Axum router wiring for the agent's own HTTP surface.
//!
//! Ops routes are not tracked: health checks and scrapes are not service traffic.

use axum::{routing::get, Router};

use crate::{app_state::AgentState, ops};

pub fn build_router(state: AgentState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .route("/metrics/preview", get(ops::preview))
        .with_state(state)
}
