//! Process-wide counter store and its ingestion API.
//!
//! Construct one `MetricsAggregator` at startup and hand clones to request
//! handlers and to the reporter. Every clone shares the same state; the state
//! lives until the last clone is dropped (normally process exit).
//!
//! Ingestion calls are synchronous, O(1) and never fail: a single mutex guards
//! the whole `MetricsState` and a poisoned guard is recovered rather than
//! propagated.

mod state;

pub use state::MetricsState;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pizzametrics_core::{HttpMethod, Order};

use crate::middleware;

#[derive(Clone, Default)]
pub struct MetricsAggregator {
    state: Arc<Mutex<MetricsState>>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("metrics state guard poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Lock for an ingestion call. The surrounding tracked request, if any,
    /// is marked so the middleware does not count it again.
    fn ingest(&self) -> MutexGuard<'_, MetricsState> {
        middleware::mark_recorded();
        self.lock()
    }

    /// Count a request. Unknown methods only bump the total.
    pub fn record_http_request(&self, method: &str, elapsed: Duration) {
        self.ingest().count_request(HttpMethod::parse(method), elapsed);
    }

    /// Count a request that opened a user session.
    pub fn record_user_connect(&self, method: &str, elapsed: Duration) {
        let mut s = self.ingest();
        s.count_request(HttpMethod::parse(method), elapsed);
        s.active_users += 1;
    }

    /// Count a logout (a DELETE request) and close one user session.
    pub fn record_user_disconnect(&self, elapsed: Duration) {
        let mut s = self.ingest();
        s.count_request(Some(HttpMethod::Delete), elapsed);
        s.active_users -= 1;
    }

    /// Count a login attempt (a PUT request). Success also opens a session.
    pub fn record_auth_attempt(&self, succeeded: bool, elapsed: Duration) {
        let mut s = self.ingest();
        s.count_request(Some(HttpMethod::Put), elapsed);
        if succeeded {
            s.active_users += 1;
            s.successful_auth = s.successful_auth.saturating_add(1);
        } else {
            s.failed_auth = s.failed_auth.saturating_add(1);
        }
    }

    /// Count an order submission (a POST request).
    pub fn record_order(&self, order: &Order, succeeded: bool, elapsed: Duration) {
        self.ingest().count_order(order, succeeded, elapsed);
    }

    /// Copy of the current counters; nothing is reset.
    pub fn snapshot(&self) -> MetricsState {
        *self.lock()
    }

    /// Copy the counters and zero the windowed ones in one critical section.
    pub fn take_window(&self) -> MetricsState {
        let mut s = self.lock();
        let snap = *s;
        s.reset_window();
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::ResourceUsage;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn per_method_counts_match_calls() {
        let agg = MetricsAggregator::new();
        for _ in 0..5 {
            agg.record_http_request("GET", ms(1));
        }
        for _ in 0..3 {
            agg.record_http_request("post", ms(1));
        }
        agg.record_http_request("PUT", ms(1));
        agg.record_http_request("DELETE", ms(1));
        agg.record_http_request("PATCH", ms(1));
        agg.record_http_request("", ms(1));

        let s = agg.snapshot();
        assert_eq!(s.get_requests, 5);
        assert_eq!(s.post_requests, 3);
        assert_eq!(s.put_requests, 1);
        assert_eq!(s.delete_requests, 1);
        assert_eq!(s.total_requests, 12);
        assert_eq!(s.request_latency, ms(12));
    }

    #[test]
    fn connect_then_disconnect_leaves_gauge_unchanged() {
        let agg = MetricsAggregator::new();
        agg.record_user_connect("POST", ms(2));
        let before = agg.snapshot().active_users;

        agg.record_user_connect("POST", ms(2));
        agg.record_user_disconnect(ms(3));

        let s = agg.snapshot();
        assert_eq!(s.active_users, before);
        assert_eq!(s.post_requests, 2);
        assert_eq!(s.delete_requests, 1);
    }

    #[test]
    fn gauge_tolerates_going_negative() {
        let agg = MetricsAggregator::new();
        agg.record_user_disconnect(ms(1));
        agg.record_user_disconnect(ms(1));
        assert_eq!(agg.snapshot().active_users, -2);
    }

    #[test]
    fn auth_success_counts_put_once_and_opens_session() {
        let agg = MetricsAggregator::new();
        agg.record_auth_attempt(true, ms(4));

        let s = agg.snapshot();
        assert_eq!(s.successful_auth, 1);
        assert_eq!(s.failed_auth, 0);
        assert_eq!(s.active_users, 1);
        assert_eq!(s.put_requests, 1);
        assert_eq!(s.total_requests, 1);
    }

    #[test]
    fn auth_failure_counts_put_without_session() {
        let agg = MetricsAggregator::new();
        agg.record_auth_attempt(false, ms(4));

        let s = agg.snapshot();
        assert_eq!(s.failed_auth, 1);
        assert_eq!(s.successful_auth, 0);
        assert_eq!(s.active_users, 0);
        assert_eq!(s.put_requests, 1);
    }

    #[test]
    fn successful_order_counts_pizzas_and_revenue() {
        let agg = MetricsAggregator::new();
        let order = Order::from_prices([5.0, 3.0]);
        agg.record_order(&order, true, ms(40));

        let s = agg.snapshot();
        assert_eq!(s.pizzas_sold, 2);
        assert_eq!(s.revenue, 8.0);
        assert_eq!(s.pizza_latency, ms(40));
        assert_eq!(s.failed_pizzas, 0);
        assert_eq!(s.post_requests, 1);
        assert_eq!(s.total_requests, 1);
    }

    #[test]
    fn failed_order_counts_failure_only() {
        let agg = MetricsAggregator::new();
        let order = Order::from_prices([5.0, 3.0]);
        agg.record_order(&order, false, ms(25));

        let s = agg.snapshot();
        assert_eq!(s.failed_pizzas, 1);
        assert_eq!(s.pizzas_sold, 0);
        assert_eq!(s.revenue, 0.0);
        assert_eq!(s.pizza_latency, ms(25));
        assert_eq!(s.request_latency, ms(25));
        assert_eq!(s.post_requests, 1);
        assert_eq!(s.total_requests, 1);
    }

    #[test]
    fn empty_or_unpriceable_orders_are_tolerated() {
        let agg = MetricsAggregator::new();
        agg.record_order(&Order::default(), true, ms(1));
        agg.record_order(&Order::from_prices([f64::NAN, -2.0, 1.5]), true, ms(1));

        let s = agg.snapshot();
        assert_eq!(s.pizzas_sold, 3);
        assert_eq!(s.revenue, 1.5);
    }

    #[test]
    fn take_window_resets_windowed_counters_only() {
        let agg = MetricsAggregator::new();
        agg.record_http_request("GET", ms(10));
        agg.record_auth_attempt(true, ms(5));
        agg.record_auth_attempt(false, ms(5));
        agg.record_order(&Order::from_prices([2.0]), true, ms(30));
        agg.record_order(&Order::from_prices([2.0]), false, ms(30));

        let before = agg.snapshot();
        let taken = agg.take_window();
        assert_eq!(taken, before);

        let after = agg.snapshot();
        assert_eq!(after.successful_auth, 0);
        assert_eq!(after.failed_auth, 0);
        assert_eq!(after.pizzas_sold, 0);
        assert_eq!(after.failed_pizzas, 0);
        assert_eq!(after.revenue, 0.0);
        assert_eq!(after.pizza_latency, Duration::ZERO);
        assert_eq!(after.request_latency, Duration::ZERO);

        assert_eq!(after.total_requests, before.total_requests);
        assert_eq!(after.get_requests, 1);
        assert_eq!(after.put_requests, 2);
        assert_eq!(after.post_requests, 2);
        assert_eq!(after.active_users, 1);
    }

    #[test]
    fn concurrent_ingestion_is_not_lost() {
        let agg = MetricsAggregator::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let agg = agg.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        agg.record_http_request("GET", ms(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let s = agg.snapshot();
        assert_eq!(s.get_requests, 8000);
        assert_eq!(s.total_requests, 8000);
    }

    #[test]
    fn poisoned_guard_keeps_counting() {
        let agg = MetricsAggregator::new();
        agg.record_http_request("GET", ms(1));

        let poisoner = agg.clone();
        let res = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("handler panicked while holding the guard");
        })
        .join();
        assert!(res.is_err());
        assert!(agg.state.is_poisoned());

        agg.record_http_request("GET", ms(1));
        let s = agg.take_window();
        assert_eq!(s.get_requests, 2);
        assert_eq!(s.request_latency, ms(2));
    }

    #[test]
    fn measurements_follow_fixed_order() {
        let agg = MetricsAggregator::new();
        agg.record_http_request("GET", ms(7));
        agg.record_user_connect("PUT", ms(3));
        agg.record_order(&Order::from_prices([0.5, 0.25]), true, ms(20));

        let usage = ResourceUsage {
            cpu_percent: 37.5,
            memory_percent: 61.25,
        };
        let lines: Vec<String> = agg
            .snapshot()
            .measurements("svc", &usage)
            .iter()
            .map(|m| m.encode().unwrap())
            .collect();

        assert_eq!(
            lines,
            vec![
                "total_request,source=svc,method=all total=3",
                "get_request,source=svc,method=get total=1",
                "post_request,source=svc,method=post total=1",
                "delete_request,source=svc,method=delete total=0",
                "put_request,source=svc,method=put total=1",
                "cpu_usage,source=svc usage=37.5",
                "memory_usage,source=svc usage=61.25",
                "active_users,source=svc count=1",
                "failed_auth,source=svc count=0",
                "success_auth,source=svc count=0",
                "pizza_purchases,source=svc count=2",
                "failed_purchases,source=svc count=0",
                "revenue,source=svc count=0.75",
                "pizza_latency,source=svc delay=20",
                "request_latency,source=svc delay=30",
            ]
        );
    }
}
