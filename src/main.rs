//! Global-India Tracker: binary entrypoint.
//! Loads configuration, starts the refresh scheduler and serves the read API.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use global_india_tracker::{
    api::{self, AppState},
    config::TrackerConfig,
    gazetteer,
    ingest::transport::HttpFeedSource,
    metrics::Metrics,
    Orchestrator, TrackerState,
};

/// Compact logs filtered by `RUST_LOG`. A subscriber installed by the
/// runtime takes precedence, hence `try_init`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("global_india_tracker=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::load_default().context("loading tracker config")?;
    let metrics = Metrics::init(cfg.refresh_secs)?;

    for c in gazetteer::collisions() {
        tracing::debug!(
            target: "gazetteer",
            shorter = c.shorter,
            longer = c.longer,
            shadows = c.shadows,
            "gazetteer entry is a substring of another"
        );
    }

    let source = Arc::new(HttpFeedSource::new(cfg.http_timeout())?);
    let state = Arc::new(TrackerState::new());
    let orchestrator = Arc::new(Orchestrator::from_config(&cfg, source, state));

    tracing::info!(
        target: "cycle",
        refresh_secs = cfg.refresh_secs,
        topics = cfg.topics.len(),
        proxies = cfg.proxies.len(),
        "starting scheduler"
    );
    Arc::clone(&orchestrator).spawn_scheduler(cfg.refresh_interval());

    let router = api::router(AppState { orchestrator }).merge(metrics.router());

    Ok(router.into())
}
