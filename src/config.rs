use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_DB_PATH: &str = "data/listings.sqlite";

/// Runtime configuration, read once from the environment and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub scoring: ScoringConfig,
    pub db_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub direct_timeout: Duration,
    pub browser_timeout: Duration,
    pub api_timeout: Duration,
    pub browser_enabled: bool,
    /// Enables the extraction-API strategy when present.
    pub spider_api_key: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            direct_timeout: Duration::from_millis(10_000),
            browser_timeout: Duration::from_millis(30_000),
            api_timeout: Duration::from_millis(20_000),
            browser_enabled: true,
            spider_api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Ascending €/m² cut-offs for the 20/15/10/5 price bands.
    pub price_per_m2_bands: [f64; 4],
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_per_m2_bands: [1500.0, 2500.0, 3500.0, 5000.0],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrape: ScrapeConfig::default(),
            scoring: ScoringConfig::default(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Config {
    /// Load from process environment (after `.env`, if any).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();

        if let Some(ms) = millis(&get, "LISTING_SCOUT_DIRECT_TIMEOUT_MS")? {
            cfg.scrape.direct_timeout = ms;
        }
        if let Some(ms) = millis(&get, "LISTING_SCOUT_BROWSER_TIMEOUT_MS")? {
            cfg.scrape.browser_timeout = ms;
        }
        if let Some(ms) = millis(&get, "LISTING_SCOUT_API_TIMEOUT_MS")? {
            cfg.scrape.api_timeout = ms;
        }
        if let Some(v) = get("LISTING_SCOUT_BROWSER") {
            let v = v.trim().to_lowercase();
            cfg.scrape.browser_enabled = !matches!(v.as_str(), "0" | "false" | "no" | "off");
        }
        cfg.scrape.spider_api_key = get("SPIDER_API_KEY").filter(|k| !k.trim().is_empty());

        if let Some(p) = get("LISTING_SCOUT_DB") {
            cfg.db_path = PathBuf::from(p);
        }
        if let Some(bands) = get("LISTING_SCOUT_PPM2_BANDS") {
            cfg.scoring.price_per_m2_bands = parse_bands(&bands)?;
        }
        Ok(cfg)
    }
}

fn millis(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = get(key) else {
        return Ok(None);
    };
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of milliseconds, got '{}'", key, raw))?;
    if ms == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Some(Duration::from_millis(ms)))
}

fn parse_bands(raw: &str) -> Result<[f64; 4]> {
    let values = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("LISTING_SCOUT_PPM2_BANDS: bad number in '{}'", raw))?;
    let bands: [f64; 4] = match values.try_into() {
        Ok(b) => b,
        Err(v) => bail!("LISTING_SCOUT_PPM2_BANDS needs 4 values, got {}", v.len()),
    };
    if bands.windows(2).any(|w| w[0] >= w[1]) || bands[0] <= 0.0 {
        bail!("LISTING_SCOUT_PPM2_BANDS must be positive and strictly ascending: {:?}", bands);
    }
    Ok(bands)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.scrape.direct_timeout, Duration::from_secs(10));
        assert_eq!(cfg.scrape.browser_timeout, Duration::from_secs(30));
        assert_eq!(cfg.scrape.api_timeout, Duration::from_secs(20));
        assert!(cfg.scrape.browser_enabled);
        assert!(cfg.scrape.spider_api_key.is_none());
        assert_eq!(cfg.db_path, PathBuf::from("data/listings.sqlite"));
        assert_eq!(cfg.scoring, ScoringConfig::default());
    }

    #[test]
    fn overrides() {
        let cfg = load(&[
            ("LISTING_SCOUT_DIRECT_TIMEOUT_MS", "2500"),
            ("LISTING_SCOUT_BROWSER", "false"),
            ("SPIDER_API_KEY", "sk-test"),
            ("LISTING_SCOUT_PPM2_BANDS", "1000, 2000,3000,4000"),
        ])
        .unwrap();
        assert_eq!(cfg.scrape.direct_timeout, Duration::from_millis(2500));
        assert!(!cfg.scrape.browser_enabled);
        assert_eq!(cfg.scrape.spider_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.scoring.price_per_m2_bands, [1000.0, 2000.0, 3000.0, 4000.0]);
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let cfg = load(&[("SPIDER_API_KEY", "  ")]).unwrap();
        assert!(cfg.scrape.spider_api_key.is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(load(&[("LISTING_SCOUT_API_TIMEOUT_MS", "soon")]).is_err());
        assert!(load(&[("LISTING_SCOUT_PPM2_BANDS", "1,2,3")]).is_err());
        assert!(load(&[("LISTING_SCOUT_PPM2_BANDS", "3000,2000,4000,5000")]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load(&[("LISTING_SCOUT_BROWSER_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"), "{}", err);
        assert!(load(&[("LISTING_SCOUT_BROWSER_TIMEOUT_MS", "1")]).is_ok());
    }
}
