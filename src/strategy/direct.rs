use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use super::ExtractionStrategy;
use crate::errors::ScrapeFailure;

pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_3) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
];

pub(crate) fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Plain HTTP GET with browser-like headers.
pub struct DirectStrategy {
    client: reqwest::Client,
    timeout: Duration,
}

impl DirectStrategy {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-PT,pt;q=0.9,en;q=0.8"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

// The request URL is dropped from the message; the caller already logs it.
fn transport_failure(e: reqwest::Error, timeout: Duration) -> ScrapeFailure {
    let e = e.without_url();
    if e.is_timeout() {
        ScrapeFailure::Timeout(timeout)
    } else if let Some(status) = e.status() {
        ScrapeFailure::from_status(status.as_u16()).unwrap_or(ScrapeFailure::Network(e.to_string()))
    } else if e.is_connect() || e.is_request() {
        ScrapeFailure::Network(format!("connection failed: {}", e))
    } else {
        ScrapeFailure::Network(e.to_string())
    }
}

#[async_trait]
impl ExtractionStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapeFailure> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(|e| transport_failure(e, self.timeout))?;

        let status = resp.status().as_u16();
        if let Some(failure) = ScrapeFailure::from_status(status) {
            tracing::debug!(%url, status, "direct fetch rejected");
            return Err(failure);
        }
        resp.text().await.map_err(|e| transport_failure(e, self.timeout))
    }
}

// ── Tests ──
