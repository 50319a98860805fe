//! Feed Fetcher: shuffled proxy chain with one retry per proxy, then a single
//! fallback request to a transformation endpoint that returns JSON.
//!
//! The public contract ([`FeedFetcher::fetch`]) never fails: exhaustion is
//! logged, counted and degraded to an empty batch for this cycle only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::ingest::parser::{parse_rss, parse_rss2json};
use crate::ingest::types::{Candidate, Category, FeedSource, NewsRecord};

const MIN_FEED_LEN: usize = 50;
const RETRIES_PER_PROXY: u32 = 1;

/// One fixed category/query pairing, fetched once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub category: Category,
    pub query: String,
    pub max_age_days: u32,
    pub max_items: usize,
    /// Whether this topic's records feed the geo extractor.
    #[serde(default = "default_geo_tagged")]
    pub geo_tagged: bool,
}

fn default_geo_tagged() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// URL prefixes; the percent-encoded target is appended.
    pub proxies: Vec<String>,
    /// rss2json-style prefix; the percent-encoded target is appended.
    pub fallback_endpoint: String,
    pub retry_backoff: Duration,
}

pub struct FeedFetcher {
    source: Arc<dyn FeedSource>,
    cfg: FetcherConfig,
}

/// Google News RSS search URL for `query` restricted to the last `max_age_days`.
pub fn google_news_url(query: &str, max_age_days: u32) -> String {
    let full = format!("{query} when:{}d", max_age_days.max(1));
    format!(
        "https://news.google.com/rss/search?q={}&hl=en-US&gl=US&ceid=US:en",
        urlencoding::encode(&full)
    )
}

/// Structural sanity check for raw feed markup.
pub fn looks_like_feed(body: &str) -> bool {
    body.len() >= MIN_FEED_LEN
        && (body.contains("<?xml") || body.contains("<rss") || body.contains("<feed"))
}

impl FeedFetcher {
    pub fn new(source: Arc<dyn FeedSource>, cfg: FetcherConfig) -> Self {
        Self { source, cfg }
    }

    /// Proxies in a fresh random order, so one failing endpoint is not always hit first.
    fn shuffled_proxies(&self) -> Vec<String> {
        let mut order = self.cfg.proxies.clone();
        order.shuffle(&mut rand::rng());
        order
    }

    async fn attempt_proxy(&self, proxy: &str, target: &str) -> Result<Vec<Candidate>, FetchError> {
        let buster = chrono::Utc::now().timestamp_millis();
        let url = format!("{proxy}{}&_t={buster}", urlencoding::encode(target));
        counter!("tracker_fetch_attempts_total").increment(1);

        let body = self.source.fetch_text(&url).await?;
        if !looks_like_feed(&body) {
            return Err(FetchError::format(format!(
                "invalid feed response ({} bytes)",
                body.len()
            )));
        }
        parse_rss(&body)
    }

    async fn attempt_fallback(&self, target: &str) -> Result<Vec<Candidate>, FetchError> {
        let url = format!("{}{}", self.cfg.fallback_endpoint, urlencoding::encode(target));
        counter!("tracker_fallback_total").increment(1);
        let body = self.source.fetch_text(&url).await?;
        parse_rss2json(&body)
    }

    /// Raw candidates for `target`, trying every proxy (plus one retry each)
    /// before the fallback endpoint.
    pub async fn fetch_candidates(&self, target: &str) -> Result<Vec<Candidate>, FetchError> {
        let mut attempts = 0usize;

        for proxy in self.shuffled_proxies() {
            for attempt in 0..=RETRIES_PER_PROXY {
                if attempt > 0 {
                    tokio::time::sleep(self.cfg.retry_backoff * attempt).await;
                }
                attempts += 1;
                match self.attempt_proxy(&proxy, target).await {
                    Ok(items) => return Ok(items),
                    Err(e) => {
                        counter!("tracker_fetch_failures_total", "kind" => e.kind()).increment(1);
                        tracing::debug!(
                            target: "fetch",
                            source = self.source.name(),
                            proxy = %proxy,
                            attempt,
                            error = %e,
                            "proxy attempt failed"
                        );
                    }
                }
            }
        }

        tracing::info!(target: "fetch", attempts, "proxies exhausted, switching to JSON fallback");
        attempts += 1;
        match self.attempt_fallback(target).await {
            Ok(items) => Ok(items),
            Err(e) => {
                counter!("tracker_fetch_failures_total", "kind" => e.kind()).increment(1);
                tracing::debug!(target: "fetch", error = %e, "fallback failed");
                Err(FetchError::Exhausted {
                    target: target.to_string(),
                    attempts,
                })
            }
        }
    }

    /// Fetch, filter, classify and dedup one topic. Never fails: an exhausted
    /// topic yields an empty batch for this cycle.
    pub async fn fetch_at(&self, topic: &Topic, now: i64) -> Vec<NewsRecord> {
        self.fetch_report_at(topic, now).await.0
    }

    /// As [`fetch_at`](Self::fetch_at), plus the failure kind when every
    /// strategy failed, so callers can tell an outage from a quiet feed.
    pub async fn fetch_report_at(
        &self,
        topic: &Topic,
        now: i64,
    ) -> (Vec<NewsRecord>, Option<&'static str>) {
        let t0 = Instant::now();
        let target = google_news_url(&topic.query, topic.max_age_days);

        let candidates = match self.fetch_candidates(&target).await {
            Ok(c) => c,
            Err(e) => {
                counter!("tracker_topic_failures_total", "category" => topic.category.label())
                    .increment(1);
                tracing::warn!(
                    target: "fetch",
                    source = self.source.name(),
                    category = topic.category.label(),
                    kind = e.kind(),
                    error = %e,
                    "all strategies failed, topic skipped this cycle"
                );
                return (Vec::new(), Some(e.kind()));
            }
        };

        let records = crate::ingest::prepare_batch(now, topic, candidates);
        histogram!("tracker_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(
            target: "fetch",
            source = self.source.name(),
            category = topic.category.label(),
            kept = records.len(),
            "topic fetched"
        );
        (records, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_news_url_encodes_query_and_window() {
        let url = google_news_url("\"India China\" border", 0);
        assert!(url.starts_with("https://news.google.com/rss/search?q="));
        assert!(url.contains("%22India%20China%22%20border%20when%3A1d"));
        assert!(url.ends_with("&hl=en-US&gl=US&ceid=US:en"));
        assert!(google_news_url("x", 4).contains("when%3A4d"));
    }

    #[test]
    fn sanity_check_rejects_short_or_foreign_bodies() {
        assert!(!looks_like_feed(""));
        assert!(!looks_like_feed("<rss></rss>"));
        let html = format!("<html>{}</html>", "x".repeat(100));
        assert!(!looks_like_feed(&html));
        let rss = format!("<rss version=\"2.0\"><channel>{}</channel></rss>", " ".repeat(40));
        assert!(looks_like_feed(&rss));
    }

    #[test]
    fn topic_geo_tagging_defaults_on() {
        let t: Topic = toml::from_str(
            r#"
            category = "Trade"
            query = "India exports"
            max_age_days = 3
            max_items = 20
            "#,
        )
        .unwrap();
        assert!(t.geo_tagged);
        assert_eq!(t.category, Category::Trade);
    }
}
