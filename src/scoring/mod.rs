//! Deterministic listing scores.
//!
//! The overall score blends three sub-scores: listing quality (0.40), space
//! efficiency (0.35) and data completeness (0.25). Location context is
//! reported and feeds the narratives, but carries no weight.

pub mod completeness;
pub mod listing;
pub mod location;
pub mod narrative;
pub mod quality;
pub mod space;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::model::PropertyData;
pub use completeness::DataCompleteness;
pub use listing::{ListingQuality, QualityLevel};
pub use location::{AreaType, LocationContext};
pub use quality::DataQuality;
pub use space::{SpaceEfficiency, SpaceRating};

const LISTING_WEIGHT: f64 = 0.40;
const SPACE_WEIGHT: f64 = 0.35;
const COMPLETENESS_WEIGHT: f64 = 0.25;
const PARTIAL_DATA_FLOOR: u8 = 20;

pub const DISCLAIMER: &str = "This analysis is generated automatically from the listing as published. \
It is not a professional valuation; verify all details independently before making decisions.";

/// Points for the first `(threshold, points)` pair the value reaches.
/// Bands are listed highest threshold first.
pub(crate) fn band<T: PartialOrd + Copy>(value: T, bands: &[(T, u8)]) -> u8 {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, pts)| *pts)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub listing_quality: u8,
    pub space_efficiency: u8,
    pub data_completeness: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScore {
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: OverallScore,
    pub listing_quality: ListingQuality,
    pub space_efficiency: SpaceEfficiency,
    pub location_context: LocationContext,
    pub data_completeness: DataCompleteness,
    pub data_quality: DataQuality,
    pub recommendations: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    pub disclaimer: String,
}

/// Pure `PropertyData -> AnalysisResult`. Never fails: missing data lowers
/// scores and raises flags instead.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    cfg: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }

    pub fn analyze(&self, data: &PropertyData) -> AnalysisResult {
        let data_quality = quality::assess(data);
        let listing_quality = listing::score(data);
        let space_efficiency = space::score(data, &self.cfg);
        let location_context = location::score(data);
        let data_completeness = completeness::score(data);

        let overall_score = overall(
            data,
            &data_quality,
            listing_quality.score,
            space_efficiency.score,
            data_completeness.score,
        );

        let story = narrative::narrate(&narrative::Signals {
            data,
            quality: &data_quality,
            listing: &listing_quality,
            space: &space_efficiency,
            location: &location_context,
            completeness: &data_completeness,
        });

        tracing::debug!(
            url = %data.url,
            score = overall_score.score,
            critical = data_quality.has_critical_issues,
            "analyzed listing"
        );

        AnalysisResult {
            overall_score,
            listing_quality,
            space_efficiency,
            location_context,
            data_completeness,
            data_quality,
            recommendations: story.recommendations,
            risks: story.risks,
            opportunities: story.opportunities,
            analyzed_at: Utc::now(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

fn overall(data: &PropertyData, dq: &DataQuality, lq: u8, se: u8, dc: u8) -> OverallScore {
    if dq.has_critical_issues {
        return OverallScore {
            score: 0,
            breakdown: ScoreBreakdown {
                listing_quality: 0,
                space_efficiency: 0,
                data_completeness: 0,
            },
            explanation: "Score withheld: both price and area are missing, so the listing cannot be valued."
                .to_string(),
        };
    }

    let parts = [
        f64::from(lq) * LISTING_WEIGHT,
        f64::from(se) * SPACE_WEIGHT,
        f64::from(dc) * COMPLETENESS_WEIGHT,
    ];
    let weighted = parts.iter().sum::<f64>().round().clamp(0.0, 100.0) as u8;

    let partially_known = data.known_price().is_some()
        || data.known_area().is_some()
        || data.known_location().is_some();
    let score = if partially_known {
        weighted.max(PARTIAL_DATA_FLOOR)
    } else {
        weighted
    };

    let mut explanation = format!(
        "Listing quality {} x 0.40 + space efficiency {} x 0.35 + data completeness {} x 0.25 = {}.",
        lq, se, dc, weighted
    );
    if score > weighted {
        explanation.push_str(&format!(
            " Raised to the minimum of {} because part of the core data is known.",
            PARTIAL_DATA_FLOOR
        ));
    }

    OverallScore {
        score,
        breakdown: ScoreBreakdown {
            listing_quality: parts[0].round() as u8,
            space_efficiency: parts[1].round() as u8,
            data_completeness: parts[2].round() as u8,
        },
        explanation,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    /// Two-bed flat in central Lisbon with five photos and no description.
    fn lisbon_flat() -> PropertyData {
        let mut p = PropertyData::new("https://www.idealista.pt/imovel/1/");
        p.title = "Apartamento T2".into();
        p.price = Some(250_000.0);
        p.area = Some(100.0);
        p.rooms = Some(2);
        p.bathrooms = Some(1);
        p.location = Some("Lisboa centro".into());
        p.features = vec!["Parking".into()];
        p.images = (1..=5).map(|i| format!("https://img.example/{}.jpg", i)).collect();
        p.description = Some(String::new());
        p
    }

    #[test]
    fn lisbon_flat_scores() {
        let r = engine().analyze(&lisbon_flat());
        assert_eq!(r.space_efficiency.score, 80);
        assert_eq!(r.space_efficiency.space_rating, Some(SpaceRating::Spacious));
        // photos 18 + features 4 + core fields 20
        assert_eq!(r.listing_quality.score, 42);
        assert_eq!(r.listing_quality.level, QualityLevel::Fair);
        // 15+15+15+8+7 + 5 images + 1 feature + title 3
        assert_eq!(r.data_completeness.score, 69);
        // 16.8 + 28 + 17.25
        assert_eq!(r.overall_score.score, 62);
        assert_eq!(
            r.overall_score.breakdown,
            ScoreBreakdown {
                listing_quality: 17,
                space_efficiency: 28,
                data_completeness: 17,
            }
        );
        assert_eq!(r.location_context.score, 85);
    }

    #[test]
    fn zero_price_and_area_scores_zero() {
        let mut p = lisbon_flat();
        p.price = Some(0.0);
        p.area = Some(0.0);
        let r = engine().analyze(&p);
        assert_eq!(r.overall_score.score, 0);
        assert!(r.data_quality.has_critical_issues);
        assert_eq!(r.risks[0], "Price and area are both missing - the listing cannot be valued");
    }

    #[test]
    fn sparse_listings_sit_at_the_floor() {
        let mut p = PropertyData::new("https://example.pt/1");
        p.price = Some(90_000.0);
        let r = engine().analyze(&p);
        assert!(!r.data_quality.has_critical_issues);
        // 5 x 0.40 + 40 x 0.35 + 15 x 0.25 = 19.75
        assert_eq!(r.overall_score.score, 20);
        assert!(r.overall_score.explanation.starts_with("Listing quality 5 x 0.40"));

        let mut q = PropertyData::new("https://example.pt/2");
        q.area = Some(30.0);
        assert_eq!(engine().analyze(&q).overall_score.score, 20);
    }

    #[test]
    fn location_alone_is_still_critical() {
        let mut p = PropertyData::new("https://example.pt/1");
        p.location = Some("Porto".into());
        let r = engine().analyze(&p);
        assert!(r.data_quality.has_critical_issues);
        assert_eq!(r.overall_score.score, 0);
    }

    #[test]
    fn scores_stay_in_range() {
        let mut full = lisbon_flat();
        full.images = (0..40).map(|i| i.to_string()).collect();
        full.features = (0..40).map(|i| format!("feature {}", i)).collect();
        full.description = Some("d".repeat(900));
        full.coordinates = Some(Coordinates { lat: 38.7, lon: -9.1 });
        full.price = Some(50_000.0);

        let mut odd = PropertyData::new("https://example.pt/odd");
        odd.price = Some(f64::MAX);
        odd.area = Some(0.0001);
        odd.rooms = Some(u32::MAX);
        odd.bathrooms = Some(u32::MAX);

        for p in [full, odd, PropertyData::new("https://example.pt/empty"), lisbon_flat()] {
            let r = engine().analyze(&p);
            assert!(r.overall_score.score <= 100);
            assert!(r.listing_quality.score <= 100);
            assert!(r.space_efficiency.score <= 100);
            assert!(r.location_context.score <= 100);
            assert!(r.data_completeness.score <= 100);
        }
    }

    #[test]
    fn repeated_analysis_is_identical_except_timestamp() {
        let p = lisbon_flat();
        let mut a = serde_json::to_value(engine().analyze(&p)).unwrap();
        let mut b = serde_json::to_value(engine().analyze(&p)).unwrap();
        a["analyzedAt"] = serde_json::Value::Null;
        b["analyzedAt"] = serde_json::Value::Null;
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn narrative_lists_are_bounded_and_ordered() {
        let mut p = lisbon_flat();
        p.price = Some(100_000.0);
        p.features = vec!["Piscina".into(), "Jardim".into(), "Vista mar".into(), "Terraço".into()];
        let r = engine().analyze(&p);
        assert!(r.recommendations.len() <= 6);
        assert!(r.risks.len() <= 4);
        assert!(r.opportunities.len() <= 4);
        assert!(r.recommendations[0].starts_with("Competitive pricing at €1000/m²"));
        assert_eq!(
            r.opportunities,
            vec![
                "Price per m² below the usual market range - potential for appreciation",
                "Attractive location with strong rental and resale potential",
                "Premium amenities (pool or sea view) support resale value",
                "Outdoor space adds lifestyle and resale value",
            ]
        );
    }

    #[test]
    fn general_advice_closes_short_recommendation_lists() {
        let r = engine().analyze(&lisbon_flat());
        assert_eq!(
            r.recommendations.last().map(String::as_str),
            Some("Consider future resale potential and market trends")
        );
    }

    #[test]
    fn location_does_not_move_overall_score() {
        let mut a = lisbon_flat();
        let mut b = lisbon_flat();
        a.location = Some("Lisboa centro".into());
        b.location = Some("Rua qualquer".into());
        let (ra, rb) = (engine().analyze(&a), engine().analyze(&b));
        assert_ne!(ra.location_context.score, rb.location_context.score);
        assert_eq!(ra.overall_score.score, rb.overall_score.score);
    }

    #[test]
    fn json_shape() {
        let v = serde_json::to_value(engine().analyze(&lisbon_flat())).unwrap();
        assert_eq!(v["overallScore"]["score"], 62);
        assert_eq!(v["overallScore"]["breakdown"]["spaceEfficiency"], 28);
        assert_eq!(v["spaceEfficiency"]["spaceRating"], "spacious");
        assert_eq!(v["dataQuality"]["hasCriticalIssues"], false);
        assert!(v["disclaimer"].as_str().unwrap().contains("not a professional valuation"));
    }

    #[test]
    fn bands_pick_first_reached_threshold() {
        let table: &[(usize, u8)] = &[(10, 3), (5, 2), (1, 1)];
        assert_eq!(band(0, table), 0);
        assert_eq!(band(1, table), 1);
        assert_eq!(band(7, table), 2);
        assert_eq!(band(99, table), 3);
    }
}
