use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ErrorClassifier, ErrorEnvelope};

/// Supported listing portals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Idealista,
    Imovirtual,
    Olx,
    Supercasa,
    CasaSapo,
    Unknown,
}

impl Site {
    pub fn supported() -> &'static [Site] {
        &[
            Site::Idealista,
            Site::Imovirtual,
            Site::Olx,
            Site::Supercasa,
            Site::CasaSapo,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Idealista => "idealista",
            Site::Imovirtual => "imovirtual",
            Site::Olx => "olx",
            Site::Supercasa => "supercasa",
            Site::CasaSapo => "casasapo",
            Site::Unknown => "unknown",
        }
    }

    /// Human-facing portal name used in error text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Site::Idealista => "Idealista",
            Site::Imovirtual => "Imovirtual",
            Site::Olx => "OLX",
            Site::Supercasa => "Supercasa",
            Site::CasaSapo => "Casa Sapo",
            Site::Unknown => "the listing site",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRef {
    pub site: Site,
    pub property_id: String,
}

struct Rule {
    site: Site,
    host: &'static str,
    paths: Vec<Regex>,
}

// Ordered: the first rule whose host matches wins.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).unwrap();
    vec![
        Rule {
            site: Site::Idealista,
            host: "idealista.pt",
            paths: vec![re(r"^/(?:en/)?imovel/(\d+)")],
        },
        Rule {
            site: Site::Imovirtual,
            host: "imovirtual.com",
            paths: vec![
                re(r"-ID([A-Za-z0-9]+)\.html$"),
                re(r"^/pt/anuncio/([^/]+)"),
            ],
        },
        Rule {
            site: Site::Olx,
            host: "olx.pt",
            paths: vec![re(r"-ID([A-Za-z0-9]+)\.html$")],
        },
        Rule {
            site: Site::Supercasa,
            host: "supercasa.pt",
            paths: vec![re(r"/(\d+)/?$")],
        },
        Rule {
            site: Site::CasaSapo,
            host: "casa.sapo.pt",
            paths: vec![re(r"/([^/]+)\.html$")],
        },
    ]
});

/// Maps listing URLs to `(site, propertyId)` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlIdentifier;

impl UrlIdentifier {
    pub fn new() -> Self {
        Self
    }

    /// Identify the portal and native id of a listing URL.
    ///
    /// Unknown hosts are not an error: they yield `Site::Unknown` with the last
    /// path segment as a best-effort id.
    pub fn identify(&self, raw: &str) -> Result<ListingRef, ErrorEnvelope> {
        let url = Url::parse(raw.trim()).map_err(|e| {
            ErrorClassifier::validation(&[format!("invalid URL '{}': {}", raw.trim(), e)])
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ErrorClassifier::validation(&[format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )]));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ErrorClassifier::validation(&["URL has no host".to_string()]))?
            .to_lowercase();
        let path = url.path();

        let rule = RULES.iter().find(|r| host_matches(&host, r.host));
        let Some(rule) = rule else {
            return Ok(ListingRef {
                site: Site::Unknown,
                property_id: last_segment(path),
            });
        };

        let property_id = rule
            .paths
            .iter()
            .find_map(|re| re.captures(path).map(|c| c[1].to_string()))
            .unwrap_or_else(|| last_segment(path));

        Ok(ListingRef {
            site: rule.site,
            property_id,
        })
    }

    pub fn is_supported(&self, raw: &str) -> bool {
        self.identify(raw)
            .map(|r| r.site != Site::Unknown)
            .unwrap_or(false)
    }
}

fn host_matches(host: &str, pattern: &str) -> bool {
    host == pattern || host.ends_with(&format!(".{}", pattern))
}

fn last_segment(path: &str) -> String {
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(".html").to_string())
        .unwrap_or_default()
}

// ── Tests ──
