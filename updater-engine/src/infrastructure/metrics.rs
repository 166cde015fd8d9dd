// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus counters/histograms, scraped via the `/metrics` HTTP route
//! (C8). One `Metrics` instance is constructed at startup and cloned
//! (internally `Arc`-backed by the `prometheus` crate's registry handles)
//! into every layer that needs to record an outcome.

use prometheus::{CounterVec, HistogramVec, Opts, Registry};

#[derive(Clone)]
pub struct Metrics {
    pub jobs_total: CounterVec,
    pub actions_total: CounterVec,
    pub checks_total: CounterVec,
    pub rollback_total: CounterVec,
    pub job_duration_seconds: HistogramVec,
    registry: Registry,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let jobs_total = CounterVec::new(Opts::new("jobs_total", "Update jobs by terminal status"), &["status"]).expect("valid metric");
        let actions_total = CounterVec::new(Opts::new("actions_total", "Actions executed by type and status"), &["type", "status"]).expect("valid metric");
        let checks_total = CounterVec::new(Opts::new("checks_total", "Checks executed by type and status"), &["type", "status"]).expect("valid metric");
        let rollback_total = CounterVec::new(Opts::new("rollback_total", "Rollback attempts by status"), &["status"]).expect("valid metric");
        let job_duration_seconds = HistogramVec::new(prometheus::HistogramOpts::new("job_duration_seconds", "Job wall-clock duration"), &["status"]).expect("valid metric");

        registry.register(Box::new(jobs_total.clone())).expect("unique metric name");
        registry.register(Box::new(actions_total.clone())).expect("unique metric name");
        registry.register(Box::new(checks_total.clone())).expect("unique metric name");
        registry.register(Box::new(rollback_total.clone())).expect("unique metric name");
        registry.register(Box::new(job_duration_seconds.clone())).expect("unique metric name");

        Self { jobs_total, actions_total, checks_total, rollback_total, job_duration_seconds, registry }
    }

    /// Renders the registry in Prometheus text exposition format for the
    /// `/metrics` route.
    pub fn render(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf).expect("encoding never fails for well-formed metrics");
        String::from_utf8(buf).expect("prometheus text format is always valid utf-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metric_names() {
        let metrics = Metrics::new();
        metrics.jobs_total.with_label_values(&["completed"]).inc();
        let rendered = metrics.render();
        assert!(rendered.contains("jobs_total"));
    }
}
