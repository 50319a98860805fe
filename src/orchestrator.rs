// src/orchestrator.rs
//! Cycle driver: one concurrent fan-out per cycle over every topic plus the
//! seismic and market feeds, followed by a single merge into shared state.
//!
//! Reentrancy is gated by a flag owned by each `Orchestrator` instance; a
//! cycle requested while another is in flight is skipped, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::{counter, gauge};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::TrackerConfig;
use crate::geo;
use crate::ingest::fetcher::{FeedFetcher, Topic};
use crate::ingest::market::MarketClient;
use crate::ingest::seismic::SeismicClient;
use crate::ingest::types::{Category, FeedSource, NewsRecord};
use crate::risk;
use crate::state::{CycleBatch, TrackerState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    pub category: Category,
    pub fetched: usize,
    /// `FetchError::kind` when every endpoint failed.
    pub failure: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: i64,
    pub topics: Vec<TopicReport>,
    pub seismic_events: usize,
    pub seismic_failed: bool,
    pub market_rate: f64,
    /// The rate above is the prior one.
    pub market_failed: bool,
    pub risk_countries: usize,
    pub markers_located: usize,
}

impl CycleReport {
    /// Topics that came back empty (exhausted or nothing in window).
    pub fn empty_topics(&self) -> Vec<Category> {
        self.topics
            .iter()
            .filter(|t| t.fetched == 0)
            .map(|t| t.category)
            .collect()
    }

    /// Topics whose fetch failed outright, as opposed to an empty window.
    pub fn failed_topics(&self) -> Vec<Category> {
        self.topics
            .iter()
            .filter(|t| t.failure.is_some())
            .map(|t| t.category)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Another cycle was already running.
    Skipped,
    Completed(CycleReport),
}

/// Clears the in-flight flag on drop, including on panic or cancellation.
/// Owns its flag so it can move into a spawned task.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Orchestrator {
    state: Arc<TrackerState>,
    fetcher: FeedFetcher,
    seismic: SeismicClient,
    market: MarketClient,
    topics: Vec<Topic>,
    in_flight: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        state: Arc<TrackerState>,
        fetcher: FeedFetcher,
        seismic: SeismicClient,
        market: MarketClient,
        topics: Vec<Topic>,
    ) -> Self {
        Self {
            state,
            fetcher,
            seismic,
            market,
            topics,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wire every client to the same `source` using `cfg`.
    pub fn from_config(cfg: &TrackerConfig, source: Arc<dyn FeedSource>, state: Arc<TrackerState>) -> Self {
        Self::new(
            state,
            FeedFetcher::new(source.clone(), cfg.fetcher_config()),
            SeismicClient::new(source.clone(), cfg.seismic_url.clone()),
            MarketClient::new(source, cfg.market_url.clone(), cfg.market_quote.clone()),
            cfg.topics.clone(),
        )
    }

    pub fn state(&self) -> &Arc<TrackerState> {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        self.run_cycle_at(chrono::Utc::now().timestamp()).await
    }

    /// Run one cycle with an explicit clock.
    pub async fn run_cycle_at(&self, now: i64) -> CycleOutcome {
        let Some(guard) = self.try_begin() else {
            tracing::debug!(target: "cycle", "cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        };
        CycleOutcome::Completed(self.run_cycle_guarded(now, guard).await)
    }

    fn try_begin(&self) -> Option<InFlight> {
        let guard = InFlight::acquire(&self.in_flight);
        if guard.is_none() {
            counter!("tracker_cycles_skipped_total").increment(1);
        }
        guard
    }

    /// The cycle body; `_guard` keeps the flag raised until it returns.
    async fn run_cycle_guarded(&self, now: i64, _guard: InFlight) -> CycleReport {
        tracing::info!(target: "cycle", topics = self.topics.len(), "cycle started");
        let prior_market = self.state.market();

        let topic_fetches = join_all(
            self.topics
                .iter()
                .map(|t| self.fetcher.fetch_report_at(t, now)),
        );
        let (topic_results, (seismic, seismic_failure), (market, market_failure)) = tokio::join!(
            topic_fetches,
            self.seismic.fetch_report(),
            self.market.fetch_report(&prior_market)
        );
        let (batches, failures): (Vec<_>, Vec<_>) = topic_results.into_iter().unzip();

        let news: Vec<(Category, Vec<NewsRecord>)> = self
            .topics
            .iter()
            .map(|t| t.category)
            .zip(batches)
            .collect();

        let risks = news
            .iter()
            .find(|(c, _)| *c == Category::DiasporaSafety)
            .map(|(_, recs)| risk::analyze(recs))
            .unwrap_or_default();

        let geo_input: Vec<NewsRecord> = self
            .topics
            .iter()
            .zip(news.iter())
            .filter(|(t, _)| t.geo_tagged)
            .flat_map(|(_, (_, recs))| recs.iter().cloned())
            .collect();
        let markers = geo::locate(&geo_input);

        let report = CycleReport {
            started_at: now,
            topics: news
                .iter()
                .zip(failures)
                .map(|((category, recs), failure)| TopicReport {
                    category: *category,
                    fetched: recs.len(),
                    failure,
                })
                .collect(),
            seismic_events: seismic.len(),
            seismic_failed: seismic_failure.is_some(),
            market_rate: market.rate,
            market_failed: market_failure.is_some(),
            risk_countries: risks.len(),
            markers_located: markers.len(),
        };

        self.state.apply(
            CycleBatch {
                news,
                risks,
                markers,
                seismic,
                market,
            },
            now,
        );

        counter!("tracker_cycles_total").increment(1);
        gauge!("tracker_last_cycle_ts").set(now as f64);
        tracing::info!(
            target: "cycle",
            empty_topics = report.empty_topics().len(),
            failed_topics = report.failed_topics().len(),
            seismic = report.seismic_events,
            seismic_failed = report.seismic_failed,
            market_failed = report.market_failed,
            risks = report.risk_countries,
            markers = report.markers_located,
            "cycle merged"
        );

        report
    }

    /// On-demand cycle in the background. Returns `false` when one is
    /// already running (the request is dropped).
    /// The flag is raised before this returns, so a cycle started right
    /// after a successful trigger is skipped.
    pub fn trigger(self: &Arc<Self>) -> bool {
        let Some(guard) = self.try_begin() else {
            return false;
        };
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let now = chrono::Utc::now().timestamp();
            this.run_cycle_guarded(now, guard).await;
        });
        true
    }

    /// Periodic cycles every `every`; the first tick fires immediately and
    /// serves as the initial load.
    pub fn spawn_scheduler(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let CycleOutcome::Skipped = self.run_cycle().await {
                    tracing::debug!(target: "cycle", "scheduled tick overlapped a running cycle");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let g = InFlight::acquire(&flag).expect("first acquire");
        assert!(InFlight::acquire(&flag).is_none());
        drop(g);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlight::acquire(&flag).is_some());
    }

    #[test]
    fn empty_topics_lists_zero_counts() {
        let report = CycleReport {
            started_at: 0,
            topics: vec![
                TopicReport {
                    category: Category::Trade,
                    fetched: 0,
                    failure: None,
                },
                TopicReport {
                    category: Category::AiTech,
                    fetched: 3,
                    failure: None,
                },
                TopicReport {
                    category: Category::FactCheck,
                    fetched: 0,
                    failure: Some("exhausted"),
                },
            ],
            seismic_events: 0,
            seismic_failed: false,
            market_rate: 84.0,
            market_failed: false,
            risk_countries: 0,
            markers_located: 0,
        };
        assert_eq!(report.empty_topics(), vec![Category::Trade, Category::FactCheck]);
        assert_eq!(report.failed_topics(), vec![Category::FactCheck]);
    }
}
