//! Listing acquisition and scoring for Portuguese property portals.
//!
//! [`AnalysisPipeline`] takes a listing URL through the cascading
//! [`ScrapeOrchestrator`] and the [`ScoringEngine`]. Failures surface as
//! classified [`ErrorEnvelope`]s.

pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod identify;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod scraper;
pub mod strategy;

pub use config::Config;
pub use errors::{ErrorClassifier, ErrorEnvelope, ErrorKind, ScrapeFailure};
pub use identify::{ListingRef, Site, UrlIdentifier};
pub use model::{Coordinates, PropertyData};
pub use pipeline::{AnalysisPipeline, Enricher, Enrichment, PipelineOutput, Store};
pub use scoring::{AnalysisResult, ScoringEngine};
pub use scraper::ScrapeOrchestrator;
pub use strategy::ExtractionStrategy;
