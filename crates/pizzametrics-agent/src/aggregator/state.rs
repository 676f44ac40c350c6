use std::time::Duration;

use pizzametrics_core::{HttpMethod, Measurement, Order};

use crate::sampler::ResourceUsage;

/// Counter store guarded by the aggregator.
///
/// - cumulative: `total_requests`, per-method counts (never reset)
/// - gauge: `active_users` (never reset, may go negative on unmatched disconnects)
/// - windowed: everything else, zeroed after each flush
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsState {
    pub total_requests: u64,
    pub get_requests: u64,
    pub post_requests: u64,
    pub put_requests: u64,
    pub delete_requests: u64,

    pub active_users: i64,

    pub successful_auth: u64,
    pub failed_auth: u64,
    pub pizzas_sold: u64,
    pub failed_pizzas: u64,
    pub revenue: f64,
    pub pizza_latency: Duration,
    pub request_latency: Duration,
}

impl MetricsState {
    pub fn requests(&self, method: HttpMethod) -> u64 {
        match method {
            HttpMethod::Get => self.get_requests,
            HttpMethod::Post => self.post_requests,
            HttpMethod::Put => self.put_requests,
            HttpMethod::Delete => self.delete_requests,
        }
    }

    pub(crate) fn count_request(&mut self, method: Option<HttpMethod>, elapsed: Duration) {
        self.request_latency = self.request_latency.saturating_add(elapsed);
        self.total_requests = self.total_requests.saturating_add(1);

        let slot = match method {
            Some(HttpMethod::Get) => &mut self.get_requests,
            Some(HttpMethod::Post) => &mut self.post_requests,
            Some(HttpMethod::Put) => &mut self.put_requests,
            Some(HttpMethod::Delete) => &mut self.delete_requests,
            None => return,
        };
        *slot = slot.saturating_add(1);
    }

    pub(crate) fn count_order(&mut self, order: &Order, succeeded: bool, elapsed: Duration) {
        self.pizza_latency = self.pizza_latency.saturating_add(elapsed);
        self.count_request(Some(HttpMethod::Post), elapsed);

        if !succeeded {
            self.failed_pizzas = self.failed_pizzas.saturating_add(1);
            return;
        }

        for item in order.items() {
            self.pizzas_sold = self.pizzas_sold.saturating_add(1);
            // Unpriceable items still count as sold but leave revenue untouched.
            if item.price.is_finite() && item.price > 0.0 {
                self.revenue += item.price;
            }
        }
    }

    /// Zero the windowed counters. Cumulative counters and the gauge stay.
    pub(crate) fn reset_window(&mut self) {
        self.successful_auth = 0;
        self.failed_auth = 0;
        self.pizzas_sold = 0;
        self.failed_pizzas = 0;
        self.revenue = 0.0;
        self.pizza_latency = Duration::ZERO;
        self.request_latency = Duration::ZERO;
    }

    /// Build the per-tick measurement set, in emission order.
    pub fn measurements(&self, source: &str, usage: &ResourceUsage) -> Vec<Measurement> {
        let sourced = |name: &str| Measurement::new(name).tag("source", source);

        let mut out = Vec::with_capacity(15);

        out.push(
            Measurement::new("total_request")
                .tag("source", source)
                .tag("method", "all")
                .field("total", self.total_requests),
        );
        for method in HttpMethod::ALL {
            out.push(
                Measurement::new(format!("{}_request", method.as_tag()))
                    .tag("source", source)
                    .tag("method", method.as_tag())
                    .field("total", self.requests(method)),
            );
        }

        out.push(sourced("cpu_usage").field("usage", usage.cpu_percent));
        out.push(sourced("memory_usage").field("usage", usage.memory_percent));

        out.push(sourced("active_users").field("count", self.active_users));

        out.push(sourced("failed_auth").field("count", self.failed_auth));
        out.push(sourced("success_auth").field("count", self.successful_auth));

        out.push(sourced("pizza_purchases").field("count", self.pizzas_sold));
        out.push(sourced("failed_purchases").field("count", self.failed_pizzas));
        out.push(sourced("revenue").field("count", self.revenue));

        out.push(sourced("pizza_latency").field("delay", millis(self.pizza_latency)));
        out.push(sourced("request_latency").field("delay", millis(self.request_latency)));

        out
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
