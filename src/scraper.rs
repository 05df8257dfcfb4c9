use std::time::Instant;

use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::errors::{ErrorClassifier, ErrorEnvelope, ScrapeFailure};
use crate::identify::UrlIdentifier;
use crate::model::PropertyData;
use crate::strategy::{default_strategies, ExtractionStrategy};

/// Runs extraction strategies in priority order until one yields a listing.
pub struct ScrapeOrchestrator {
    identifier: UrlIdentifier,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    classifier: ErrorClassifier,
}

impl ScrapeOrchestrator {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self {
            identifier: UrlIdentifier::new(),
            strategies,
            classifier: ErrorClassifier::new(),
        }
    }

    pub fn from_config(cfg: &ScrapeConfig) -> Self {
        Self::new(default_strategies(cfg))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Scrape one listing.
    ///
    /// Strategies run one after another, never in parallel, and are not
    /// retried. When all of them fail the envelope of the last one is
    /// returned, not the first.
    pub async fn scrape(&self, url: &str) -> Result<PropertyData, ErrorEnvelope> {
        let target = self.identifier.identify(url)?;
        let url = url.trim();

        let mut last: Option<ErrorEnvelope> = None;
        for strategy in &self.strategies {
            let start = Instant::now();
            let attempt = strategy.extract(url, target.site);
            let outcome = match tokio::time::timeout(strategy.timeout(), attempt).await {
                Ok(Ok(data)) if data.title.trim().is_empty() => Err(ScrapeFailure::NoTitle),
                Ok(result) => result,
                Err(_) => Err(ScrapeFailure::Timeout(strategy.timeout())),
            };
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(mut data) => {
                    data.site = target.site;
                    data.property_id = target.property_id.clone();
                    info!(
                        %url,
                        site = %target.site,
                        strategy = strategy.name(),
                        elapsed_ms,
                        "scraped listing"
                    );
                    return Ok(data);
                }
                Err(failure) => {
                    let envelope = self.classifier.classify_failure(&failure, url, target.site);
                    warn!(
                        %url,
                        strategy = strategy.name(),
                        kind = ?envelope.kind,
                        elapsed_ms,
                        "strategy failed: {}",
                        failure
                    );
                    last = Some(envelope);
                }
            }
        }

        Err(last.unwrap_or_else(|| {
            self.classifier
                .classify("no extraction strategy configured", url, target.site)
        }))
    }
}

// ── Tests ──
