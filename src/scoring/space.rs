use serde::{Deserialize, Serialize};

use super::band;
use crate::config::ScoringConfig;
use crate::model::PropertyData;

const BASELINE: u16 = 50;
const NO_DATA_SCORE: u8 = 40;
const PRICE_BAND_POINTS: [u8; 4] = [20, 15, 10, 5];
const BATHROOM_BANDS: &[(f64, u8)] = &[(1.0, 10), (0.75, 8), (0.5, 5), (0.0, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceRating {
    Spacious,
    Good,
    Standard,
    Compact,
    Small,
}

impl SpaceRating {
    fn from_area_per_room(apr: f64) -> (Self, u8) {
        if apr >= 30.0 {
            (SpaceRating::Spacious, 15)
        } else if apr >= 25.0 {
            (SpaceRating::Good, 12)
        } else if apr >= 20.0 {
            (SpaceRating::Standard, 8)
        } else if apr >= 15.0 {
            (SpaceRating::Compact, 4)
        } else {
            (SpaceRating::Small, 0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceEfficiency {
    pub score: u8,
    pub data_available: bool,
    pub price_per_m2: Option<f64>,
    pub area_per_room: Option<f64>,
    pub bathroom_ratio: Option<f64>,
    pub space_rating: Option<SpaceRating>,
    pub price_points: u8,
    pub layout_points: u8,
    pub bathroom_points: u8,
}

pub fn score(p: &PropertyData, cfg: &ScoringConfig) -> SpaceEfficiency {
    let price_per_m2 = p.price_per_m2();
    let area_per_room = p.area_per_room();
    let bathroom_ratio = p.bathroom_ratio();

    if price_per_m2.is_none() && area_per_room.is_none() && bathroom_ratio.is_none() {
        return SpaceEfficiency {
            score: NO_DATA_SCORE,
            data_available: false,
            price_per_m2: None,
            area_per_room: None,
            bathroom_ratio: None,
            space_rating: None,
            price_points: 0,
            layout_points: 0,
            bathroom_points: 0,
        };
    }

    let price_points = price_per_m2
        .map(|ppm2| price_band(ppm2, &cfg.price_per_m2_bands))
        .unwrap_or(0);
    let (space_rating, layout_points) = match area_per_room.map(SpaceRating::from_area_per_room) {
        Some((rating, pts)) => (Some(rating), pts),
        None => (None, 0),
    };
    let bathroom_points = bathroom_ratio.map(|r| band(r, BATHROOM_BANDS)).unwrap_or(0);

    let total = BASELINE
        + u16::from(price_points)
        + u16::from(layout_points)
        + u16::from(bathroom_points);

    SpaceEfficiency {
        score: total.min(100) as u8,
        data_available: true,
        price_per_m2,
        area_per_room,
        bathroom_ratio,
        space_rating,
        price_points,
        layout_points,
        bathroom_points,
    }
}

// Cheaper is better: the first cut-off the price sits under decides.
fn price_band(ppm2: f64, cutoffs: &[f64; 4]) -> u8 {
    cutoffs
        .iter()
        .zip(PRICE_BAND_POINTS)
        .find(|(cut, _)| ppm2 < **cut)
        .map(|(_, pts)| pts)
        .unwrap_or(0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: f64, area: f64, rooms: u32, baths: u32) -> PropertyData {
        let mut p = PropertyData::new("https://example.pt/1");
        p.price = Some(price);
        p.area = Some(area);
        p.rooms = Some(rooms);
        p.bathrooms = Some(baths);
        p
    }

    #[test]
    fn two_bed_lisbon_flat_scores_eighty() {
        let s = score(&listing(250_000.0, 100.0, 2, 1), &ScoringConfig::default());
        assert_eq!(s.price_per_m2, Some(2500.0));
        assert_eq!(s.price_points, 10);
        assert_eq!(s.area_per_room, Some(50.0));
        assert_eq!(s.layout_points, 15);
        assert_eq!(s.space_rating, Some(SpaceRating::Spacious));
        assert_eq!(s.bathroom_ratio, Some(0.5));
        assert_eq!(s.bathroom_points, 5);
        assert_eq!(s.score, 80);
        assert!(s.data_available);
    }

    #[test]
    fn price_bands_at_edges() {
        let cfg = ScoringConfig::default();
        let pts: Vec<u8> = [1499.0, 1500.0, 2499.0, 3499.0, 4999.0, 5000.0, 9000.0]
            .iter()
            .map(|v| price_band(*v, &cfg.price_per_m2_bands))
            .collect();
        assert_eq!(pts, vec![20, 15, 15, 10, 5, 0, 0]);
    }

    #[test]
    fn configurable_price_bands() {
        let cfg = ScoringConfig {
            price_per_m2_bands: [3000.0, 4000.0, 5000.0, 6000.0],
        };
        let s = score(&listing(250_000.0, 100.0, 2, 1), &cfg);
        assert_eq!(s.price_points, 20);
    }

    #[test]
    fn layout_ratings() {
        let cases = [
            (30.0, SpaceRating::Spacious, 15),
            (25.0, SpaceRating::Good, 12),
            (20.0, SpaceRating::Standard, 8),
            (15.0, SpaceRating::Compact, 4),
            (14.9, SpaceRating::Small, 0),
        ];
        for (apr, rating, pts) in cases {
            assert_eq!(SpaceRating::from_area_per_room(apr), (rating, pts), "{}", apr);
        }
    }

    #[test]
    fn bathroom_bands() {
        let b = |rooms, baths| {
            let p = listing(1.0, 1.0, rooms, baths);
            score(&p, &ScoringConfig::default()).bathroom_points
        };
        assert_eq!(b(2, 2), 10);
        assert_eq!(b(4, 3), 8);
        assert_eq!(b(2, 1), 5);
        assert_eq!(b(3, 1), 2);
        assert_eq!(b(2, 0), 2);
    }

    #[test]
    fn nothing_pairs_up() {
        let mut p = PropertyData::new("https://example.pt/1");
        p.price = Some(200_000.0);
        p.bathrooms = Some(1);
        let s = score(&p, &ScoringConfig::default());
        assert_eq!(s.score, 40);
        assert!(!s.data_available);
        assert!(s.space_rating.is_none());
    }

    #[test]
    fn partial_pairs_keep_baseline() {
        let mut p = PropertyData::new("https://example.pt/1");
        p.area = Some(50.0);
        p.rooms = Some(2);
        let s = score(&p, &ScoringConfig::default());
        assert_eq!(s.score, 62);
        assert_eq!(s.space_rating, Some(SpaceRating::Good));
        assert!(s.price_per_m2.is_none());
    }
}
