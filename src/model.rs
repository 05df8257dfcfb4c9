use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identify::Site;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Normalized listing record produced by one scrape attempt.
///
/// Never patched after it is returned: a retry builds a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyData {
    pub url: String,
    pub site: Site,
    pub property_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub area: Option<f64>,
    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

impl PropertyData {
    /// Empty record for `url`, stamped with the current time.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            site: Site::Unknown,
            property_id: String::new(),
            title: String::new(),
            description: None,
            price: None,
            area: None,
            rooms: None,
            bathrooms: None,
            location: None,
            coordinates: None,
            features: Vec::new(),
            images: Vec::new(),
            scraped_at: Utc::now(),
        }
    }

    /// Price when present and strictly positive.
    pub fn known_price(&self) -> Option<f64> {
        self.price.filter(|p| *p > 0.0)
    }

    /// Area when present and strictly positive.
    pub fn known_area(&self) -> Option<f64> {
        self.area.filter(|a| *a > 0.0)
    }

    pub fn known_rooms(&self) -> Option<u32> {
        self.rooms.filter(|r| *r > 0)
    }

    /// Zero is a stated value (a studio or bare shell), not a gap.
    pub fn known_bathrooms(&self) -> Option<u32> {
        self.bathrooms
    }

    pub fn known_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn description_len(&self) -> usize {
        self.description
            .as_deref()
            .map(|d| d.trim().chars().count())
            .unwrap_or(0)
    }

    pub fn price_per_m2(&self) -> Option<f64> {
        Some(self.known_price()? / self.known_area()?)
    }

    pub fn area_per_room(&self) -> Option<f64> {
        Some(self.known_area()? / f64::from(self.known_rooms()?))
    }

    pub fn bathroom_ratio(&self) -> Option<f64> {
        Some(f64::from(self.known_bathrooms()?) / f64::from(self.known_rooms()?))
    }

    /// Case-insensitive substring match against any listed feature.
    pub fn has_feature(&self, keywords: &[&str]) -> bool {
        self.features.iter().any(|f| {
            let lower = f.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_count_as_missing() {
        let mut p = PropertyData::new("https://example.com/1");
        p.price = Some(0.0);
        p.area = Some(0.0);
        p.rooms = Some(0);
        p.location = Some("   ".into());
        assert!(p.known_price().is_none());
        assert!(p.known_area().is_none());
        assert!(p.known_rooms().is_none());
        assert!(p.known_location().is_none());
        assert!(p.price_per_m2().is_none());
    }

    #[test]
    fn derived_ratios() {
        let mut p = PropertyData::new("https://example.com/1");
        p.price = Some(250_000.0);
        p.area = Some(100.0);
        p.rooms = Some(2);
        p.bathrooms = Some(1);
        assert_eq!(p.price_per_m2(), Some(2500.0));
        assert_eq!(p.area_per_room(), Some(50.0));
        assert_eq!(p.bathroom_ratio(), Some(0.5));
    }

    #[test]
    fn zero_bathrooms_is_a_stated_value() {
        let mut p = PropertyData::new("https://example.com/1");
        p.rooms = Some(2);
        p.bathrooms = Some(0);
        assert_eq!(p.known_bathrooms(), Some(0));
        assert_eq!(p.bathroom_ratio(), Some(0.0));
    }

    #[test]
    fn feature_keywords_ignore_case() {
        let mut p = PropertyData::new("https://example.com/1");
        p.features = vec!["Piscina comum".into(), "Garagem".into()];
        assert!(p.has_feature(&["piscina", "pool"]));
        assert!(!p.has_feature(&["jardim"]));
    }

    #[test]
    fn json_uses_camel_case() {
        let p = PropertyData::new("https://example.com/1");
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("propertyId").is_some());
        assert!(v.get("scrapedAt").is_some());
        assert_eq!(v["site"], "unknown");
    }
}
