//! `reqwest`-backed [`FeedSource`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::ingest::types::FeedSource;

const USER_AGENT: &str = concat!("global-india-tracker/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building feed HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::transport(url, format!("HTTP status {status}")));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::transport(url, format!("reading body: {e}")))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
