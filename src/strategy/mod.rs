//! Transports that fetch a listing page. Every strategy hands the content to
//! the same [`extract_listing`] routine.

pub mod api;
pub mod browser;
pub mod direct;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ScrapeConfig;
use crate::errors::ScrapeFailure;
use crate::extract::extract_listing;
use crate::identify::Site;
use crate::model::PropertyData;

pub use api::ApiStrategy;
pub use browser::BrowserStrategy;
pub use direct::DirectStrategy;

#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deadline the orchestrator enforces around [`extract`](Self::extract).
    fn timeout(&self) -> Duration;

    /// Raw page content for `url`.
    async fn fetch(&self, url: &str) -> Result<String, ScrapeFailure>;

    async fn extract(&self, url: &str, site: Site) -> Result<PropertyData, ScrapeFailure> {
        let html = self.fetch(url).await?;
        extract_listing(&html, url, site)
    }
}

/// Strategies in priority order: direct, then browser, then API.
///
/// The browser can be switched off and the API strategy needs a key.
pub fn default_strategies(cfg: &ScrapeConfig) -> Vec<Box<dyn ExtractionStrategy>> {
    let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
    match DirectStrategy::new(cfg.direct_timeout) {
        Ok(s) => strategies.push(Box::new(s)),
        Err(e) => tracing::warn!(error = %e, "direct strategy unavailable"),
    }
    if cfg.browser_enabled {
        strategies.push(Box::new(BrowserStrategy::new(cfg.browser_timeout)));
    }
    if let Some(key) = &cfg.spider_api_key {
        strategies.push(Box::new(ApiStrategy::new(key.clone(), cfg.api_timeout)));
    }
    strategies
}

// ── Tests ──
