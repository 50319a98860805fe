// tests/pipeline_cycle.rs
//
// Full cycles through the orchestrator against a routed mock FeedSource:
// topic fan-out, risk ranking, geo extraction, and the three merge rules
// across consecutive cycles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use global_india_tracker::error::FetchError;
use global_india_tracker::ingest::fetcher::{FeedFetcher, FetcherConfig, Topic};
use global_india_tracker::ingest::market::MarketClient;
use global_india_tracker::ingest::seismic::SeismicClient;
use global_india_tracker::ingest::types::{Category, FeedSource, Priority};
use global_india_tracker::risk::RiskLevel;
use global_india_tracker::{CycleOutcome, Orchestrator, TrackerState};

// 2025-01-06T12:00:00Z
const NOW: i64 = 1_736_164_800;

const PROXY: &str = "https://proxy.test/raw?url=";
const FALLBACK: &str = "https://fallback.test/?rss_url=";
const SEISMIC: &str = "https://seismic.test/4.5_week.geojson";
const MARKET: &str = "https://market.test/latest/USD";

/// Routes by URL; seismic and market bodies can be swapped between cycles.
struct RoutedSource {
    seismic: Mutex<Option<String>>,
    market: Mutex<Option<String>>,
}

impl RoutedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            seismic: Mutex::new(Some(quakes(&[("eq1", 4.6)]))),
            market: Mutex::new(Some(r#"{"base":"USD","rates":{"INR":83.5}}"#.to_string())),
        })
    }

    fn set_seismic(&self, body: Option<String>) {
        *self.seismic.lock().unwrap() = body;
    }

    fn set_market(&self, body: Option<String>) {
        *self.market.lock().unwrap() = body;
    }
}

fn down(url: &str) -> FetchError {
    FetchError::transport(url, "unavailable")
}

#[async_trait]
impl FeedSource for RoutedSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if url.starts_with(SEISMIC) {
            return self.seismic.lock().unwrap().clone().ok_or_else(|| down(url));
        }
        if url.starts_with(MARKET) {
            return self.market.lock().unwrap().clone().ok_or_else(|| down(url));
        }
        if !url.starts_with(PROXY) {
            return Err(down(url));
        }
        // Queries are single words, so they survive double encoding verbatim.
        if url.contains("tradeq") {
            Ok(rss(&[
                ("Mumbai port expansion approved", "https://n.test/t1", "Mon, 06 Jan 2025 11:00:00 GMT"),
                ("Sensex hits record", "https://n.test/t2", "Mon, 06 Jan 2025 10:00:00 GMT"),
            ]))
        } else if url.contains("factq") {
            Ok(rss(&[(
                "Viral claim about Mumbai flood debunked",
                "https://n.test/f1",
                "Mon, 06 Jan 2025 09:00:00 GMT",
            )]))
        } else if url.contains("diasporaq") {
            Ok(rss(&[
                ("Indian student killed in Toronto - CBC News", "https://n.test/d1", "Mon, 06 Jan 2025 11:30:00 GMT"),
                ("Protest in Toronto over visa policy", "https://n.test/d2", "Sun, 05 Jan 2025 12:00:00 GMT"),
                ("Hate graffiti found in Sydney", "https://n.test/d3", "Sat, 04 Jan 2025 12:00:00 GMT"),
                ("Diwali fair draws crowds", "https://n.test/d4", "Sat, 04 Jan 2025 10:00:00 GMT"),
            ]))
        } else {
            Err(down(url))
        }
    }

    fn name(&self) -> &'static str {
        "routed"
    }
}

fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(r#"<?xml version="1.0"?><rss version="2.0"><channel>"#);
    for (title, link, date) in items {
        body.push_str(&format!(
            "<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate><source>Wire</source></item>"
        ));
    }
    body.push_str("</channel></rss>");
    body
}

fn quakes(events: &[(&str, f64)]) -> String {
    let features: Vec<String> = events
        .iter()
        .map(|(id, mag)| {
            format!(
                r#"{{"type":"Feature","id":"{id}","properties":{{"mag":{mag},"place":"Off the coast","time":1736160000000,"url":"https://usgs.test/{id}"}},"geometry":{{"type":"Point","coordinates":[95.1,3.2,10.0]}}}}"#
            )
        })
        .collect();
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

fn topics() -> Vec<Topic> {
    let t = |category, query: &str, days, items, geo_tagged| Topic {
        category,
        query: query.to_string(),
        max_age_days: days,
        max_items: items,
        geo_tagged,
    };
    vec![
        t(Category::Trade, "tradeq", 3, 20, true),
        t(Category::FactCheck, "factq", 3, 20, false),
        t(Category::DiasporaSafety, "diasporaq", 4, 50, true),
    ]
}

fn orchestrator(source: Arc<RoutedSource>) -> Orchestrator {
    Orchestrator::new(
        Arc::new(TrackerState::new()),
        FeedFetcher::new(
            source.clone(),
            FetcherConfig {
                proxies: vec![PROXY.to_string()],
                fallback_endpoint: FALLBACK.to_string(),
                retry_backoff: Duration::ZERO,
            },
        ),
        SeismicClient::new(source.clone(), SEISMIC),
        MarketClient::new(source, MARKET, "INR"),
        topics(),
    )
}

#[tokio::test]
async fn first_cycle_populates_every_collection() {
    let orch = orchestrator(RoutedSource::new());
    let CycleOutcome::Completed(report) = orch.run_cycle_at(NOW).await else {
        panic!("cycle should run");
    };
    assert!(report.empty_topics().is_empty());
    assert!(report.failed_topics().is_empty());
    assert!(!report.seismic_failed);
    assert!(!report.market_failed);

    let snap = orch.state().snapshot();
    assert_eq!(snap.news.trade.len(), 2);
    assert_eq!(snap.news.fact_check.len(), 1);
    assert_eq!(snap.news.diaspora_raw.len(), 4);
    assert_eq!(snap.news.diaspora_raw[0].priority, Priority::High);
    assert_eq!(snap.last_cycle_at, Some(NOW));

    // Risks: Canada (critical, 2 incidents) ahead of Australia (high, 1).
    let countries: Vec<(&str, RiskLevel, usize)> = snap
        .risks
        .iter()
        .map(|r| (r.country.as_str(), r.risk_level, r.incident_count))
        .collect();
    assert_eq!(
        countries,
        vec![("Canada", RiskLevel::Critical, 2), ("Australia", RiskLevel::High, 1)]
    );
    assert_eq!(snap.risks[0].latest_headline, "Indian student killed in Toronto");

    // Markers: Mumbai (trade) and Toronto (diaspora); fact-check is never mapped.
    let marker_ids: Vec<&str> = snap.markers.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(
        marker_ids,
        vec!["https://n.test/t1", "https://n.test/d1", "https://n.test/d2"]
    );
    assert!(snap.markers.iter().all(|m| m.first_seen_at == NOW));

    assert_eq!(snap.seismic.len(), 1);
    assert_eq!(snap.seismic[0].first_seen_at, NOW);
    assert_eq!(snap.market.rate, 83.5);
    assert_eq!(snap.market.change, 0.0);
}

#[tokio::test]
async fn repeated_cycles_are_idempotent_for_news_and_markers() {
    let orch = orchestrator(RoutedSource::new());
    orch.run_cycle_at(NOW).await;
    let first = orch.state().snapshot();

    orch.run_cycle_at(NOW + 60).await;
    let second = orch.state().snapshot();

    assert_eq!(first.news, second.news);
    assert_eq!(first.markers, second.markers);
    assert_eq!(first.risks, second.risks);
    assert_eq!(second.seismic[0].first_seen_at, NOW);
    assert_eq!(second.last_cycle_at, Some(NOW + 60));
}

#[tokio::test]
async fn seismic_first_seen_survives_absence_and_market_keeps_prior_rate() {
    let src = RoutedSource::new();
    let orch = orchestrator(src.clone());

    orch.run_cycle_at(NOW).await;

    // eq1 drops out of the feed; market goes down.
    src.set_seismic(Some(quakes(&[("eq2", 5.0)])));
    src.set_market(None);
    orch.run_cycle_at(NOW + 60).await;
    let mid = orch.state().snapshot();
    assert_eq!(mid.seismic.len(), 1);
    assert_eq!(mid.seismic[0].id, "eq2");
    assert_eq!(mid.market.rate, 83.5);

    // eq1 reappears with a revised magnitude.
    src.set_seismic(Some(quakes(&[("eq1", 4.9), ("eq2", 5.0)])));
    orch.run_cycle_at(NOW + 120).await;
    let late = orch.state().snapshot();
    let eq1 = late.seismic.iter().find(|e| e.id == "eq1").unwrap();
    let eq2 = late.seismic.iter().find(|e| e.id == "eq2").unwrap();
    assert_eq!(eq1.magnitude, 4.9);
    assert_eq!(eq1.first_seen_at, NOW);
    assert_eq!(eq2.first_seen_at, NOW + 60);

    // Seismic outage empties the collection for that cycle only.
    src.set_seismic(None);
    orch.run_cycle_at(NOW + 180).await;
    assert!(orch.state().snapshot().seismic.is_empty());
}

#[tokio::test]
async fn failing_topics_leave_accumulated_lists_untouched() {
    let src = RoutedSource::new();
    let orch = orchestrator(src);
    orch.run_cycle_at(NOW).await;

    // A second orchestrator over a dead source writes into the same state.
    struct Dead;
    #[async_trait]
    impl FeedSource for Dead {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::transport(url, "dead"))
        }
        fn name(&self) -> &'static str {
            "dead"
        }
    }
    let dead: Arc<dyn FeedSource> = Arc::new(Dead);
    let state = orch.state().clone();
    let orch_dead = Orchestrator::new(
        state.clone(),
        FeedFetcher::new(
            dead.clone(),
            FetcherConfig {
                proxies: vec![PROXY.to_string()],
                fallback_endpoint: FALLBACK.to_string(),
                retry_backoff: Duration::ZERO,
            },
        ),
        SeismicClient::new(dead.clone(), SEISMIC),
        MarketClient::new(dead, MARKET, "INR"),
        topics(),
    );

    let CycleOutcome::Completed(report) = orch_dead.run_cycle_at(NOW + 60).await else {
        panic!("cycle should run");
    };
    assert_eq!(report.empty_topics().len(), 3);
    assert_eq!(report.failed_topics(), report.empty_topics());
    assert!(report
        .topics
        .iter()
        .all(|t| t.fetched == 0 && t.failure == Some("exhausted")));
    assert!(report.seismic_failed);
    assert!(report.market_failed);
    assert_eq!(report.market_rate, 83.5);

    let snap = state.snapshot();
    assert_eq!(snap.news.trade.len(), 2);
    assert_eq!(snap.news.diaspora_raw.len(), 4);
    assert_eq!(snap.markers.len(), 3);
    // Country risk has no memory: an empty diaspora batch clears it.
    assert!(snap.risks.is_empty());
    assert_eq!(snap.market.rate, 83.5);
}
