use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static DESCRIBED: OnceCell<()> = OnceCell::new();

/// Register help text for every tracker metric. Safe to call repeatedly.
pub fn describe() {
    DESCRIBED.get_or_init(|| {
        describe_counter!("tracker_fetch_attempts_total", "Proxy requests issued");
        describe_counter!("tracker_fallback_total", "Fallback endpoint requests issued");
        describe_counter!(
            "tracker_fetch_failures_total",
            "Failed fetch attempts by kind (transport, format, exhausted)"
        );
        describe_counter!(
            "tracker_topic_failures_total",
            "Topics skipped for a cycle after every strategy failed"
        );
        describe_counter!("tracker_items_parsed_total", "Feed items handed to the filter");
        describe_counter!("tracker_items_stale_total", "Items dropped by the time window");
        describe_counter!("tracker_items_dedup_total", "Items dropped as duplicates");
        describe_counter!("tracker_cycles_total", "Completed cycles");
        describe_counter!("tracker_cycles_skipped_total", "Cycles skipped while one was in flight");
        describe_gauge!("tracker_last_cycle_ts", Unit::Seconds, "Unix time of the last merged cycle");
        describe_gauge!("tracker_market_rate", "Latest USD exchange rate");
        describe_gauge!("tracker_refresh_interval_secs", Unit::Seconds, "Scheduler period");
        describe_histogram!("tracker_fetch_ms", Unit::Milliseconds, "Per-topic fetch latency");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the refresh period.
    pub fn init(refresh_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe();
        gauge!("tracker_refresh_interval_secs").set(refresh_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
