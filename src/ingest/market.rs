//! Market feed: one exchange rate. The upstream has no history, so `change`
//! is always reported as exactly zero.

use std::sync::Arc;

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FetchError;
use crate::ingest::types::FeedSource;

pub const DEFAULT_MARKET_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
pub const DEFAULT_RATE: f64 = 84.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub rate: f64,
    pub change: f64,
    pub last_updated: String,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            change: 0.0,
            last_updated: "-".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesDoc {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Rate for `quote` from an exchangerate-api style document.
pub fn parse_rate(body: &str, quote: &str) -> Result<f64, FetchError> {
    let doc: RatesDoc =
        serde_json::from_str(body).map_err(|e| FetchError::format(format!("rates: {e}")))?;
    doc.rates
        .get(quote)
        .copied()
        .filter(|r| r.is_finite() && *r > 0.0)
        .ok_or_else(|| FetchError::format(format!("rate for {quote} missing")))
}

pub struct MarketClient {
    source: Arc<dyn FeedSource>,
    url: String,
    quote: String,
}

impl MarketClient {
    pub fn new(source: Arc<dyn FeedSource>, url: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
            quote: quote.into(),
        }
    }

    /// Fresh snapshot, or `prior`'s values (with a new timestamp) plus the
    /// failure kind when the feed fails.
    pub async fn fetch_report(&self, prior: &MarketSnapshot) -> (MarketSnapshot, Option<&'static str>) {
        let last_updated = chrono::Utc::now().format("%H:%M:%S").to_string();
        let res = match self.source.fetch_text(&self.url).await {
            Ok(body) => parse_rate(&body, &self.quote),
            Err(e) => Err(e),
        };

        match res {
            Ok(rate) => {
                gauge!("tracker_market_rate").set(rate);
                let snap = MarketSnapshot {
                    rate,
                    change: 0.0,
                    last_updated,
                };
                (snap, None)
            }
            Err(e) => {
                counter!("tracker_fetch_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(
                    target: "market",
                    source = self.source.name(),
                    error = %e,
                    "market data fetch failed, keeping prior rate"
                );
                let snap = MarketSnapshot {
                    rate: prior.rate,
                    change: prior.change,
                    last_updated,
                };
                (snap, Some(e.kind()))
            }
        }
    }
}
