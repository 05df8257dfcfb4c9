use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{ErrorClassifier, ErrorEnvelope};
use crate::model::PropertyData;
use crate::scoring::{AnalysisResult, ScoringEngine};
use crate::scraper::ScrapeOrchestrator;

/// Persistence collaborator. The pipeline only ever writes through it.
pub trait Store: Send + Sync {
    fn store_property(&self, data: &PropertyData) -> anyhow::Result<()>;
    fn store_analysis(&self, data: &PropertyData, analysis: &AnalysisResult) -> anyhow::Result<()>;
}

/// Optional enrichment call (AI commentary and the like).
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, data: &PropertyData) -> anyhow::Result<serde_json::Value>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Enrichment {
    Available { data: serde_json::Value },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub property_data: PropertyData,
    pub analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

/// URL in, scored listing out.
pub struct AnalysisPipeline {
    orchestrator: ScrapeOrchestrator,
    engine: ScoringEngine,
    store: Option<Box<dyn Store>>,
    enricher: Option<Box<dyn Enricher>>,
}

impl AnalysisPipeline {
    pub fn new(orchestrator: ScrapeOrchestrator, engine: ScoringEngine) -> Self {
        Self {
            orchestrator,
            engine,
            store: None,
            enricher: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            ScrapeOrchestrator::from_config(&cfg.scrape),
            ScoringEngine::new(cfg.scoring.clone()),
        )
    }

    pub fn with_store(mut self, store: Box<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_enricher(mut self, enricher: Box<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub async fn scrape(&self, url: &str) -> Result<PropertyData, ErrorEnvelope> {
        self.orchestrator.scrape(url).await
    }

    pub fn analyze(&self, data: &PropertyData) -> AnalysisResult {
        self.engine.analyze(data)
    }

    /// Scrape, score, optionally enrich and store.
    ///
    /// Only scraping can fail the call; store and enricher problems are
    /// logged and swallowed.
    pub async fn scrape_and_analyze(&self, url: &str) -> Result<PipelineOutput, ErrorEnvelope> {
        let property_data = self.scrape(url).await?;
        Ok(self.complete(property_data).await)
    }

    /// Score an already scraped record, then store and enrich it.
    pub async fn complete(&self, property_data: PropertyData) -> PipelineOutput {
        self.persist(|s| s.store_property(&property_data), "property");

        let analysis = self.analyze(&property_data);
        self.persist(|s| s.store_analysis(&property_data, &analysis), "analysis");

        let enrichment = match &self.enricher {
            Some(e) => Some(match e.enrich(&property_data).await {
                Ok(data) => Enrichment::Available { data },
                Err(err) => {
                    warn!(url = %property_data.url, error = %err, "enrichment failed");
                    Enrichment::Unavailable {
                        reason: "Additional insights are temporarily unavailable".into(),
                    }
                }
            }),
            None => None,
        };

        info!(
            url = %property_data.url,
            site = %property_data.site,
            score = analysis.overall_score.score,
            "analysis complete"
        );
        PipelineOutput {
            property_data,
            analysis,
            enrichment,
        }
    }

    fn persist(&self, write: impl FnOnce(&dyn Store) -> anyhow::Result<()>, what: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = write(store.as_ref()) {
                warn!(error = %e, "failed to store {}", what);
            }
        }
    }
}

/// Caller-side policy: flag a scrape too sparse to analyze meaningfully.
///
/// Returns `DataIncomplete` when price, area and location are all unknown.
pub fn check_completeness(data: &PropertyData) -> Result<(), ErrorEnvelope> {
    let mut missing = Vec::new();
    if data.known_price().is_none() {
        missing.push("price");
    }
    if data.known_area().is_none() {
        missing.push("area");
    }
    if data.known_location().is_none() {
        missing.push("location");
    }
    if missing.len() == 3 {
        return Err(ErrorClassifier::data_incomplete(&missing));
    }
    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, ScrapeFailure};
    use crate::identify::Site;
    use crate::strategy::ExtractionStrategy;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const URL: &str = "https://www.idealista.pt/imovel/33445566/";

    struct Canned(Result<PropertyData, ScrapeFailure>);

    #[async_trait]
    impl ExtractionStrategy for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }
        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
        async fn fetch(&self, _url: &str) -> Result<String, ScrapeFailure> {
            unreachable!("extract is overridden")
        }
        async fn extract(&self, _url: &str, _site: Site) -> Result<PropertyData, ScrapeFailure> {
            self.0.clone()
        }
    }

    #[derive(Default, Clone)]
    struct MemoryStore {
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Store for MemoryStore {
        fn store_property(&self, data: &PropertyData) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            self.log.lock().unwrap().push(format!("property {}", data.property_id));
            Ok(())
        }
        fn store_analysis(&self, _data: &PropertyData, a: &AnalysisResult) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            self.log.lock().unwrap().push(format!("analysis {}", a.overall_score.score));
            Ok(())
        }
    }

    struct FlakyEnricher(bool);

    #[async_trait]
    impl Enricher for FlakyEnricher {
        async fn enrich(&self, data: &PropertyData) -> anyhow::Result<serde_json::Value> {
            if self.0 {
                Ok(serde_json::json!({ "summary": format!("{} looks fine", data.title) }))
            } else {
                anyhow::bail!("upstream 503")
            }
        }
    }

    fn listing() -> PropertyData {
        let mut p = PropertyData::new(URL);
        p.title = "Apartamento T2".into();
        p.price = Some(250_000.0);
        p.area = Some(100.0);
        p.rooms = Some(2);
        p.bathrooms = Some(1);
        p.location = Some("Lisboa centro".into());
        p
    }

    fn pipeline(result: Result<PropertyData, ScrapeFailure>) -> AnalysisPipeline {
        let orch = ScrapeOrchestrator::new(vec![Box::new(Canned(result))]);
        AnalysisPipeline::new(orch, ScoringEngine::default())
    }

    #[tokio::test]
    async fn url_to_scored_listing() {
        let out = pipeline(Ok(listing())).scrape_and_analyze(URL).await.unwrap();
        assert_eq!(out.property_data.site, Site::Idealista);
        assert_eq!(out.property_data.property_id, "33445566");
        assert_eq!(out.analysis.space_efficiency.score, 80);
        assert!(out.enrichment.is_none());
    }

    #[tokio::test]
    async fn scrape_failure_is_an_envelope() {
        let err = pipeline(Err(ScrapeFailure::RateLimited))
            .scrape_and_analyze(URL)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn store_receives_both_artifacts() {
        let store = MemoryStore::default();
        let log = Arc::clone(&store.log);
        pipeline(Ok(listing()))
            .with_store(Box::new(store))
            .scrape_and_analyze(URL)
            .await
            .unwrap();
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], "property 33445566");
        assert!(log[1].starts_with("analysis "));
    }

    #[tokio::test]
    async fn store_failure_does_not_fail_pipeline() {
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let out = pipeline(Ok(listing()))
            .with_store(Box::new(store))
            .scrape_and_analyze(URL)
            .await;
        assert!(out.is_ok());
    }

    #[tokio::test]
    async fn enrichment_is_attached_or_degrades() {
        let ok = pipeline(Ok(listing()))
            .with_enricher(Box::new(FlakyEnricher(true)))
            .scrape_and_analyze(URL)
            .await
            .unwrap();
        assert!(matches!(ok.enrichment, Some(Enrichment::Available { .. })));

        let degraded = pipeline(Ok(listing()))
            .with_enricher(Box::new(FlakyEnricher(false)))
            .scrape_and_analyze(URL)
            .await
            .unwrap();
        assert_eq!(
            degraded.enrichment,
            Some(Enrichment::Unavailable {
                reason: "Additional insights are temporarily unavailable".into()
            })
        );
    }

    #[test]
    fn completeness_policy() {
        assert!(check_completeness(&listing()).is_ok());

        let mut bare = PropertyData::new(URL);
        bare.title = "Apartamento".into();
        let err = check_completeness(&bare).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DataIncomplete);
        assert_eq!(err.technical_details, "Missing fields: price, area, location");

        bare.location = Some("Porto".into());
        assert!(check_completeness(&bare).is_ok());
    }

    #[test]
    fn output_json_shape() {
        let p = listing();
        let out = PipelineOutput {
            analysis: ScoringEngine::default().analyze(&p),
            property_data: p,
            enrichment: Some(Enrichment::Unavailable { reason: "offline".into() }),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert!(v.get("propertyData").is_some());
        assert_eq!(v["enrichment"]["status"], "unavailable");
    }
}
