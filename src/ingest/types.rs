// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Fixed topic enumeration. Serialized with the display labels the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "US-India")]
    UsIndia,
    #[serde(rename = "China-India")]
    ChinaIndia,
    #[serde(rename = "AI-Tech")]
    AiTech,
    #[serde(rename = "Trade")]
    Trade,
    #[serde(rename = "Human-Rights")]
    HumanRights,
    #[serde(rename = "Fact-Check")]
    FactCheck,
    #[serde(rename = "Diaspora-Safety")]
    DiasporaSafety,
    #[serde(rename = "General")]
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::UsIndia,
        Category::ChinaIndia,
        Category::AiTech,
        Category::Trade,
        Category::HumanRights,
        Category::FactCheck,
        Category::DiasporaSafety,
        Category::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::UsIndia => "US-India",
            Category::ChinaIndia => "China-India",
            Category::AiTech => "AI-Tech",
            Category::Trade => "Trade",
            Category::HumanRights => "Human-Rights",
            Category::FactCheck => "Fact-Check",
            Category::DiasporaSafety => "Diaspora-Safety",
            Category::General => "General",
        }
    }

    /// URL-friendly form, e.g. `us-india`.
    pub fn slug(self) -> String {
        self.label().to_ascii_lowercase()
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

/// One classified headline. Identity is the URL (`id == url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    pub source: String,
    pub url: String,
    /// Display string relative to the cycle that produced the record ("5m ago", "Jan 3").
    pub timestamp: String,
    /// Unix seconds.
    pub published_at: i64,
    pub category: Category,
    pub priority: Priority,
}

/// Parser output before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub source: String,
    pub raw_published: String,
}

/// The "fetch raw text given a URL" capability. Any proxy, the fallback
/// endpoint and the telemetry feeds all go through one of these.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
    fn name(&self) -> &'static str;
}
