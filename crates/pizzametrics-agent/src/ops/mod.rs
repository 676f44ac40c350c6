//! Operational HTTP endpoints.
//!
//! - `/healthz`         : liveness
//! - `/metrics`         : reporter push counters (Prometheus text format)
//! - `/metrics/preview` : current counters as line protocol (no reset, no push)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AgentState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AgentState>) -> Response {
    let body = state.stats().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn preview(State(state): State<AgentState>) -> Response {
    let usage = state.sampler().sample();
    let source = &state.cfg().metrics.source;

    let mut body = String::new();
    for m in state.aggregator().snapshot().measurements(source, &usage) {
        match m.encode() {
            Ok(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            Err(e) => tracing::warn!(measurement = %m.name(), error = %e, "preview encode failed"),
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
