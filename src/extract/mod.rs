pub mod normalize;
pub mod selectors;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::errors::ScrapeFailure;
use crate::identify::Site;
use crate::model::{Coordinates, PropertyData};
use normalize::*;
use selectors::PortalSelectors;

static MAPS_Q_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]q=(-?\d+(?:\.\d+)?),\s*(-?\d+(?:\.\d+)?)").unwrap());
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property=\"og:image\"]").unwrap());
static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type=\"application/ld+json\"]").unwrap());
static MAPS_IFRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src*=\"google.com/maps\"]").unwrap());

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title, h1, h2").unwrap());

// Interstitial-only markers. Ordinary pages never carry them.
const CHALLENGE_MARKERS: &[&str] = &[
    "cf-challenge",
    "captcha-delivery.com",
    "verify you are human",
];
// Only meaningful once extraction found nothing; listing pages embed these too
// (Cloudflare beacon scripts, noscript notices, contact-form widgets).
const CAPTCHA_HINTS: &[&str] = &[
    "cf-turnstile",
    "challenge-platform",
    "please enable js",
    "g-recaptcha",
    "h-captcha",
    "hcaptcha",
    "captcha",
];
const BLOCK_HINTS: &[&str] = &[
    "403 forbidden",
    "access denied",
    "acesso negado",
    "you have been blocked",
];
const SEARCH_PAGE_TITLES: &[&str] = &["Casas e apartamentos para comprar", "Todo o país"];

const FEATURE_MIN_CHARS: usize = 3;
const FEATURE_MAX_CHARS: usize = 49;

/// Extract a listing from raw page content.
///
/// Shared by every strategy: only the transport differs between them.
pub fn extract_listing(html: &str, url: &str, site: Site) -> Result<PropertyData, ScrapeFailure> {
    let lower = html.to_lowercase();
    if let Some(marker) = CHALLENGE_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(ScrapeFailure::Captcha(marker.to_string()));
    }

    let doc = Html::parse_document(html);
    let sel = PortalSelectors::for_site(site);

    let Some(title) = first_text(&doc, sel.title) else {
        return Err(diagnose_empty_page(&lower));
    };
    // Error pages have titles too.
    if is_block_page(&doc) {
        return Err(ScrapeFailure::Blocked);
    }
    if SEARCH_PAGE_TITLES.iter().any(|t| title.contains(t)) {
        return Err(ScrapeFailure::Parse(
            "invalid listing: search results page, not a single property".into(),
        ));
    }

    let body = visible_text(&doc);
    let mut data = PropertyData::new(url);
    data.site = site;
    data.price = first_value(&doc, sel.price, parse_price).or_else(|| find_price(&body));
    data.area = first_value(&doc, sel.area, parse_area).or_else(|| find_area(&body));
    data.rooms = first_value(&doc, sel.rooms, parse_rooms).or_else(|| find_typology(&title));
    data.bathrooms = first_value(&doc, sel.bathrooms, parse_bathrooms);
    data.location = first_text(&doc, sel.location);
    data.description = first_text(&doc, sel.description);
    data.images = collect_images(&doc, sel.images, url);
    data.features = collect_features(&doc, sel.features);
    data.coordinates = extract_coordinates(&doc);
    data.title = title;

    tracing::debug!(
        %url,
        %site,
        price = ?data.price,
        area = ?data.area,
        images = data.images.len(),
        features = data.features.len(),
        "extracted listing"
    );
    Ok(data)
}

fn diagnose_empty_page(lower: &str) -> ScrapeFailure {
    if let Some(hint) = CAPTCHA_HINTS.iter().find(|h| lower.contains(*h)) {
        ScrapeFailure::Captcha(hint.to_string())
    } else if BLOCK_HINTS.iter().any(|h| lower.contains(h)) {
        ScrapeFailure::Blocked
    } else {
        ScrapeFailure::NoTitle
    }
}

fn is_block_page(doc: &Html) -> bool {
    doc.select(&HEADINGS).any(|el| {
        let heading = el.text().collect::<String>().to_lowercase();
        BLOCK_HINTS.iter().any(|h| heading.contains(h))
    })
}

fn parse_selectors(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(sel) => Some(sel),
            Err(e) => {
                tracing::debug!(selector = %s, error = ?e, "skipping selector");
                None
            }
        })
        .collect()
}

// Meta tags carry their value in `content`.
fn element_value(el: ElementRef<'_>) -> String {
    match el.value().attr("content") {
        Some(c) => clean_text(c),
        None => clean_text(&el.text().collect::<String>()),
    }
}

fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    first_value(doc, selectors, |v| Some(v.to_string()))
}

fn first_value<T>(doc: &Html, selectors: &[&str], parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    for sel in parse_selectors(selectors) {
        for el in doc.select(&sel) {
            let value = element_value(el);
            if value.is_empty() {
                continue;
            }
            if let Some(v) = parse(&value) {
                return Some(v);
            }
        }
    }
    None
}

fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
            .is_some_and(|name| matches!(name.as_str(), "script" | "style" | "noscript" | "title"));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    clean_text(&out)
}

fn collect_images(doc: &Html, selectors: &[&str], page_url: &str) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    let mut push = |src: &str| {
        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            return;
        }
        let resolved = match &base {
            Some(b) => b.join(src).map(|u| u.to_string()).unwrap_or_else(|_| src.to_string()),
            None => src.to_string(),
        };
        if seen.insert(resolved.clone()) {
            images.push(resolved);
        }
    };

    for el in doc.select(&OG_IMAGE) {
        if let Some(c) = el.value().attr("content") {
            push(c);
        }
    }
    for sel in parse_selectors(selectors) {
        for el in doc.select(&sel) {
            let attrs = el.value();
            // Lazy galleries put a data: placeholder in src.
            let src = attrs
                .attr("src")
                .filter(|s| !s.trim().starts_with("data:"))
                .or_else(|| attrs.attr("data-src"));
            if let Some(src) = src {
                push(src);
            }
        }
    }
    images
}

fn collect_features(doc: &Html, selectors: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut features = Vec::new();
    for sel in parse_selectors(selectors) {
        for el in doc.select(&sel) {
            let text = clean_text(&el.text().collect::<String>());
            let len = text.chars().count();
            if (FEATURE_MIN_CHARS..=FEATURE_MAX_CHARS).contains(&len) && seen.insert(text.clone()) {
                features.push(text);
            }
        }
    }
    features
}

fn extract_coordinates(doc: &Html) -> Option<Coordinates> {
    for el in doc.select(&LD_JSON) {
        let raw: String = el.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) => {
                if let Some(c) = find_geo(&v) {
                    return Some(c);
                }
            }
            Err(e) => tracing::debug!(error = %e, "unreadable JSON-LD block"),
        }
    }

    let src = doc.select(&MAPS_IFRAME).find_map(|el| el.value().attr("src"))?;
    let caps = MAPS_Q_RE.captures(src)?;
    valid_coordinates(caps[1].parse().ok()?, caps[2].parse().ok()?)
}

fn find_geo(v: &Value) -> Option<Coordinates> {
    match v {
        Value::Object(map) => {
            map.get("geo")
                .and_then(geo_pair)
                .or_else(|| map.values().find_map(find_geo))
        }
        Value::Array(items) => items.iter().find_map(find_geo),
        _ => None,
    }
}

fn geo_pair(geo: &Value) -> Option<Coordinates> {
    let lat = as_f64(geo.get("latitude")?)?;
    let lon = as_f64(geo.get("longitude")?)?;
    valid_coordinates(lat, lon)
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn valid_coordinates(lat: f64, lon: f64) -> Option<Coordinates> {
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
        .then_some(Coordinates { lat, lon })
}

// ── Tests ──
