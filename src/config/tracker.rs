// src/config/tracker.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ingest::fetcher::{FetcherConfig, Topic};
use crate::ingest::market::DEFAULT_MARKET_URL;
use crate::ingest::seismic::DEFAULT_SEISMIC_URL;
use crate::ingest::types::Category;

pub const ENV_CONFIG_PATH: &str = "TRACKER_CONFIG_PATH";
pub const ENV_REFRESH_SECS: &str = "TRACKER_REFRESH_SECS";
pub const DEFAULT_CONFIG_PATH: &str = "config/tracker.toml";

const MIN_REFRESH_SECS: u64 = 5;

const STD_DAYS: u32 = 3;
const STD_LIMIT: usize = 20;
const DIASPORA_DAYS: u32 = 4;
const DIASPORA_LIMIT: usize = 50;

fn default_refresh_secs() -> u64 {
    60
}
fn default_http_timeout_secs() -> u64 {
    15
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_proxies() -> Vec<String> {
    vec![
        "https://api.allorigins.win/raw?url=".to_string(),
        "https://api.codetabs.com/v1/proxy?quest=".to_string(),
    ]
}
fn default_fallback_endpoint() -> String {
    "https://api.rss2json.com/v1/api.json?rss_url=".to_string()
}
fn default_seismic_url() -> String {
    DEFAULT_SEISMIC_URL.to_string()
}
fn default_market_url() -> String {
    DEFAULT_MARKET_URL.to_string()
}
fn default_market_quote() -> String {
    "INR".to_string()
}

fn topic(category: Category, query: &str, days: u32, limit: usize) -> Topic {
    Topic {
        category,
        query: query.to_string(),
        max_age_days: days,
        max_items: limit,
        geo_tagged: category != Category::FactCheck,
    }
}

/// The seven fixed topics. Diaspora-Safety is last so the map's
/// first-come marker pass prefers the topical lists.
pub fn default_topics() -> Vec<Topic> {
    vec![
        topic(
            Category::UsIndia,
            r#""US India" (relations OR defense OR trade OR visa OR technology OR strategic partnership OR Modi) -cricket"#,
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::ChinaIndia,
            r#""India China" (border OR LAC OR trade OR diplomacy OR military talks OR Galwan OR Arunachal) -cricket"#,
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::AiTech,
            r#"(Generative AI OR OpenAI OR Google Gemini OR NVIDIA OR "India AI" OR "AI Mission India" OR "Indian startup") (launch OR model OR chip OR investment OR regulation) 2025"#,
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::Trade,
            "India (economy OR exports OR imports OR FTA OR tariff OR manufacturing OR GDP OR Sensex OR RBI) 2025 -cricket",
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::HumanRights,
            "India (hate speech OR religious intolerance OR caste violence OR minority rights OR press freedom OR custodial death OR human rights) 2025",
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::FactCheck,
            r#"India (fake news OR misinformation OR "Indian media" OR "godi media" OR "fact check" OR debunked OR propaganda) 2025"#,
            STD_DAYS,
            STD_LIMIT,
        ),
        topic(
            Category::DiasporaSafety,
            "Indian (student OR diaspora OR expat OR national) (attacked OR killed OR hate crime OR racism OR assault OR violence OR death OR visa crisis OR deported) 2025",
            DIASPORA_DAYS,
            DIASPORA_LIMIT,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,
    #[serde(default = "default_fallback_endpoint")]
    pub fallback_endpoint: String,
    #[serde(default = "default_seismic_url")]
    pub seismic_url: String,
    #[serde(default = "default_market_url")]
    pub market_url: String,
    #[serde(default = "default_market_quote")]
    pub market_quote: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<Topic>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            proxies: default_proxies(),
            fallback_endpoint: default_fallback_endpoint(),
            seismic_url: default_seismic_url(),
            market_url: default_market_url(),
            market_quote: default_market_quote(),
            topics: default_topics(),
        }
    }
}

impl TrackerConfig {
    /// Load from an explicit TOML file, then apply env overrides and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading tracker config from {}", path.display()))?;
        let cfg: TrackerConfig = toml::from_str(&content)
            .with_context(|| format!("parsing tracker config {}", path.display()))?;
        cfg.finish()
    }

    /// Resolution order:
    /// 1) $TRACKER_CONFIG_PATH (must exist)
    /// 2) config/tracker.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Self::default().finish()
    }

    fn finish(mut self) -> Result<Self> {
        if let Ok(raw) = env::var(ENV_REFRESH_SECS) {
            self.refresh_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_REFRESH_SECS} must be an integer, got {raw:?}"))?;
        }
        self.proxies = self
            .proxies
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_secs < MIN_REFRESH_SECS {
            bail!("refresh_secs must be at least {MIN_REFRESH_SECS}, got {}", self.refresh_secs);
        }
        if self.http_timeout_secs == 0 {
            bail!("http_timeout_secs must be positive");
        }
        if self.fallback_endpoint.trim().is_empty() {
            bail!("fallback_endpoint must not be empty");
        }
        if self.topics.is_empty() {
            bail!("at least one topic is required");
        }
        let mut seen = HashSet::new();
        for t in &self.topics {
            if t.category == Category::General {
                bail!("topic category General is reserved");
            }
            if !seen.insert(t.category) {
                bail!("duplicate topic for category {}", t.category.label());
            }
            if t.query.trim().is_empty() {
                bail!("topic {} has an empty query", t.category.label());
            }
            if t.max_items == 0 {
                bail!("topic {} has max_items = 0", t.category.label());
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            proxies: self.proxies.clone(),
            fallback_endpoint: self.fallback_endpoint.clone(),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
