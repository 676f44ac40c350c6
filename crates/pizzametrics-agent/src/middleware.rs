//! Request tracking for axum services.
//!
//! Hosts wrap their routes with `instrument` (or layer `track_requests`
//! themselves). A request is counted by method together with its handler
//! latency unless the handler already recorded it: every `record_*` call on
//! `MetricsAggregator` made while the handler future runs marks the request,
//! so login and order handlers keep calling `record_auth_attempt` /
//! `record_order` and each request is still counted once.
//!
//! The marker is task-local. Recording from a task the handler spawns is not
//! seen by the tracker, and that request is counted twice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use tokio::time::Instant;

use crate::aggregator::MetricsAggregator;

tokio::task_local! {
    static RECORDED: Arc<AtomicBool>;
}

/// Flag the request currently being tracked (if any) as already recorded.
pub(crate) fn mark_recorded() {
    // Outside a tracked request there is nothing to mark.
    RECORDED
        .try_with(|flag| flag.store(true, Ordering::Relaxed))
        .unwrap_or_default();
}

pub async fn track_requests(
    State(aggregator): State<MetricsAggregator>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let recorded = Arc::new(AtomicBool::new(false));
    let started = Instant::now();

    let resp = RECORDED.scope(Arc::clone(&recorded), next.run(req)).await;

    if !recorded.load(Ordering::Relaxed) {
        aggregator.record_http_request(method.as_str(), started.elapsed());
    }
    resp
}

/// Layer `track_requests` over every route of `router`.
pub fn instrument<S>(router: Router<S>, aggregator: MetricsAggregator) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(aggregator, track_requests))
}
