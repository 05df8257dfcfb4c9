use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identify::Site;

/// Raw failure raised by an extraction strategy, before classification.
///
/// Display strings carry the trigger words [`ErrorClassifier`] looks for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScrapeFailure {
    #[error("403 forbidden: access blocked by the site")]
    Blocked,
    #[error("429 too many requests: rate limit reached")]
    RateLimited,
    #[error("captcha challenge detected ({0})")]
    Captcha(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("browser session failed: {0}")]
    Browser(String),
    #[error("extraction API failed: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("parse error: no listing title found")]
    NoTitle,
}

impl ScrapeFailure {
    /// Map an HTTP status to the matching failure, `None` for success.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            403 => Some(ScrapeFailure::Blocked),
            429 => Some(ScrapeFailure::RateLimited),
            other => Some(ScrapeFailure::Http(other)),
        }
    }

    /// Kind decided by the variant. Only the free-text browser and API
    /// messages fall back to trigger matching.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeFailure::Blocked => ErrorKind::SiteBlocked,
            ScrapeFailure::RateLimited => ErrorKind::RateLimited,
            ScrapeFailure::Captcha(_) => ErrorKind::CaptchaRequired,
            ScrapeFailure::Timeout(_) | ScrapeFailure::Network(_) => ErrorKind::NetworkError,
            ScrapeFailure::Parse(_) | ScrapeFailure::NoTitle => ErrorKind::ParsingError,
            ScrapeFailure::Http(_) => ErrorKind::ScrapingFailed,
            ScrapeFailure::Browser(msg) | ScrapeFailure::Api(msg) => {
                ErrorClassifier::new().categorize(msg)
            }
        }
    }
}

/// Fixed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ScrapingFailed,
    DataIncomplete,
    SiteBlocked,
    CaptchaRequired,
    RateLimited,
    NetworkError,
    ParsingError,
    ValidationError,
}

impl ErrorKind {
    /// Whether an automatic retry can reasonably succeed.
    pub fn recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::NetworkError | ErrorKind::CaptchaRequired
        )
    }

    /// Advisory wait before retrying. Nothing in this crate sleeps on it.
    pub fn retry_delay_ms(&self) -> u64 {
        match self {
            ErrorKind::RateLimited => 300_000,
            ErrorKind::CaptchaRequired => 60_000,
            ErrorKind::NetworkError => 30_000,
            _ => 10_000,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms())
    }
}

/// Classified, display-ready failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ErrorEnvelope {
    pub kind: ErrorKind,
    pub message: String,
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub technical_details: String,
    pub recoverable: bool,
    pub retry_delay_ms: u64,
}

impl ErrorEnvelope {
    fn build(
        kind: ErrorKind,
        message: String,
        explanation: String,
        suggestions: &[&str],
        technical_details: String,
    ) -> Self {
        Self {
            kind,
            message,
            explanation,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            technical_details,
            recoverable: kind.recoverable(),
            retry_delay_ms: kind.retry_delay_ms(),
        }
    }
}

// Checked in order; the first hit decides the kind.
const TRIGGERS: &[(&[&str], ErrorKind)] = &[
    (&["blocked", "forbidden", "403"], ErrorKind::SiteBlocked),
    (&["captcha", "challenge"], ErrorKind::CaptchaRequired),
    (
        &["rate limit", "too many requests", "429"],
        ErrorKind::RateLimited,
    ),
    (&["network", "timeout", "connection"], ErrorKind::NetworkError),
    (&["parsing", "parse", "invalid"], ErrorKind::ParsingError),
];

/// Turns raw failure messages into [`ErrorEnvelope`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Kind for a raw message, by case-insensitive substring match.
    pub fn categorize(&self, raw: &str) -> ErrorKind {
        let lower = raw.to_lowercase();
        TRIGGERS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::ScrapingFailed)
    }

    /// Envelope for an untyped failure message.
    pub fn classify(&self, raw: &str, url: &str, site: Site) -> ErrorEnvelope {
        self.envelope(self.categorize(raw), raw, url, site)
    }

    /// Envelope for a strategy failure. The variant decides the kind, so
    /// listing ids or durations inside the message never count as triggers.
    pub fn classify_failure(
        &self,
        failure: &ScrapeFailure,
        url: &str,
        site: Site,
    ) -> ErrorEnvelope {
        self.envelope(failure.kind(), &failure.to_string(), url, site)
    }

    pub fn envelope(&self, kind: ErrorKind, raw: &str, url: &str, site: Site) -> ErrorEnvelope {
        let name = site.display_name();
        tracing::debug!(%url, %site, ?kind, "classified failure");

        match kind {
            ErrorKind::SiteBlocked => ErrorEnvelope::build(
                kind,
                format!("Unable to access {} - the website is blocking automated requests", name),
                format!(
                    "{} has detected automated access and is blocking our requests. This is a common anti-bot protection measure.",
                    name
                ),
                &[
                    "Try again in a few minutes - sometimes the block is temporary",
                    "Use a different property URL from the same site",
                    "Try a different property portal (Idealista, Imovirtual, or Supercasa)",
                    "Contact the property directly if you have the listing details",
                ],
                "The website returned a 403 Forbidden or similar blocking response".into(),
            ),
            ErrorKind::CaptchaRequired => ErrorEnvelope::build(
                kind,
                format!("CAPTCHA challenge detected on {}", name),
                format!(
                    "{} is showing a CAPTCHA challenge to verify a human is browsing. Automated extraction cannot solve these challenges.",
                    name
                ),
                &[
                    "Try again in a few minutes - CAPTCHA challenges are often temporary",
                    "Use a different property URL from the same site",
                    "Try a different property portal",
                    "Open the property listing directly in your browser",
                ],
                "CAPTCHA challenge detected during scraping".into(),
            ),
            ErrorKind::RateLimited => ErrorEnvelope::build(
                kind,
                format!("Rate limit exceeded for {}", name),
                format!(
                    "Too many requests were made to {} in a short time. The website is temporarily limiting access.",
                    name
                ),
                &[
                    "Wait 5-10 minutes before trying again",
                    "Try a different property URL",
                    "Use a different property portal",
                    "The rate limit will reset automatically",
                ],
                "Rate limiting protection activated by the target website".into(),
            ),
            ErrorKind::NetworkError => ErrorEnvelope::build(
                kind,
                format!("Network connection failed for {}", name),
                format!(
                    "A stable connection to {} could not be established. The network or the website may be temporarily unavailable.",
                    name
                ),
                &[
                    "Check your internet connection",
                    "Try again in a few minutes",
                    "Verify the property URL is correct",
                    "Try a different property portal",
                ],
                "Network timeout or connection failure".into(),
            ),
            ErrorKind::ParsingError => ErrorEnvelope::build(
                kind,
                format!("Unable to extract property data from {}", name),
                format!(
                    "{} was reachable, but the property information could not be extracted. The page layout may have changed.",
                    name
                ),
                &[
                    "Try a different property URL from the same site",
                    "Try a different property portal",
                    "The website may have updated its layout",
                    "Report the URL if this persists",
                ],
                "Data extraction failed - website structure may have changed".into(),
            ),
            _ => ErrorEnvelope::build(
                ErrorKind::ScrapingFailed,
                format!("Property analysis failed for {}", name),
                format!(
                    "An unexpected issue occurred while retrieving the property from {}.",
                    name
                ),
                &[
                    "Try again in a few minutes",
                    "Use a different property URL",
                    "Try a different property portal",
                    "Report the URL if the issue persists",
                ],
                raw.to_string(),
            ),
        }
    }

    /// Envelope for a scrape that succeeded but is too sparse to analyze.
    pub fn data_incomplete(missing: &[&str]) -> ErrorEnvelope {
        let list = missing.join(", ");
        ErrorEnvelope::build(
            ErrorKind::DataIncomplete,
            "Property data is incomplete".into(),
            format!(
                "The listing was retrieved, but some important information is missing: {}.",
                list
            ),
            &[
                "Check the original property listing for complete information",
                "Contact the property agent for missing details",
                "Try a different property with more complete information",
                "Some analysis features may be limited due to missing data",
            ],
            format!("Missing fields: {}", list),
        )
    }

    pub fn validation(errors: &[String]) -> ErrorEnvelope {
        ErrorEnvelope::build(
            ErrorKind::ValidationError,
            "Property data validation failed".into(),
            "The input or extracted data contains invalid information that cannot be processed safely.".into(),
            &[
                "Verify the property URL or listing information",
                "Try a different property URL",
                "Contact the property agent to verify details",
                "Some data may need manual verification",
            ],
            format!("Validation errors: {}", errors.join(", ")),
        )
    }
}

// ── Tests ──
