use serde::{Deserialize, Serialize};

use super::band;
use crate::model::PropertyData;

// (minimum count, points), highest first.
const PHOTO_BANDS: &[(usize, u8)] = &[(15, 30), (10, 25), (5, 18), (3, 12), (1, 6)];
const DESCRIPTION_BANDS: &[(usize, u8)] = &[(500, 25), (300, 20), (150, 15), (50, 8), (1, 3)];
const FEATURE_BANDS: &[(usize, u8)] = &[(12, 25), (8, 20), (5, 15), (2, 8), (1, 4)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => QualityLevel::Excellent,
            60..=79 => QualityLevel::Good,
            40..=59 => QualityLevel::Fair,
            _ => QualityLevel::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuality {
    pub score: u8,
    pub level: QualityLevel,
    pub photo_points: u8,
    pub description_points: u8,
    pub feature_points: u8,
    pub core_field_points: u8,
}

/// Presentation of the listing itself: photos, text, features and core fields.
pub fn score(p: &PropertyData) -> ListingQuality {
    let photo_points = band(p.images.len(), PHOTO_BANDS);
    let description_points = band(p.description_len(), DESCRIPTION_BANDS);
    let feature_points = band(p.features.len(), FEATURE_BANDS);

    let core_field_points: u8 = [
        (p.known_price().is_some(), 5),
        (p.known_area().is_some(), 5),
        (p.known_location().is_some(), 4),
        (p.known_rooms().is_some(), 3),
        (p.known_bathrooms().is_some(), 3),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, pts)| pts)
    .sum();

    let total = u16::from(photo_points)
        + u16::from(description_points)
        + u16::from(feature_points)
        + u16::from(core_field_points);
    let score = total.min(100) as u8;

    ListingQuality {
        score,
        level: QualityLevel::from_score(score),
        photo_points,
        description_points,
        feature_points,
        core_field_points,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn with_counts(photos: usize, desc: usize, features: usize) -> PropertyData {
        let mut p = PropertyData::new("https://example.pt/1");
        p.images = (0..photos).map(|i| format!("https://img/{}.jpg", i)).collect();
        p.description = (desc > 0).then(|| "a".repeat(desc));
        p.features = (0..features).map(|i| format!("feature {}", i)).collect();
        p
    }

    #[test]
    fn photo_bands() {
        let pts: Vec<u8> = [0, 1, 2, 3, 5, 9, 10, 15, 40]
            .iter()
            .map(|n| score(&with_counts(*n, 0, 0)).photo_points)
            .collect();
        assert_eq!(pts, vec![0, 6, 6, 12, 18, 18, 25, 30, 30]);
    }

    #[test]
    fn description_bands() {
        let pts: Vec<u8> = [0, 10, 50, 150, 300, 499, 500]
            .iter()
            .map(|n| score(&with_counts(0, *n, 0)).description_points)
            .collect();
        assert_eq!(pts, vec![0, 3, 8, 15, 20, 20, 25]);
    }

    #[test]
    fn feature_bands() {
        let pts: Vec<u8> = [0, 1, 2, 5, 8, 12]
            .iter()
            .map(|n| score(&with_counts(0, 0, *n)).feature_points)
            .collect();
        assert_eq!(pts, vec![0, 4, 8, 15, 20, 25]);
    }

    #[test]
    fn full_listing_reaches_cap() {
        let mut p = with_counts(20, 600, 15);
        p.price = Some(1.0);
        p.area = Some(1.0);
        p.location = Some("Porto".into());
        p.rooms = Some(1);
        p.bathrooms = Some(1);
        let q = score(&p);
        assert_eq!(q.core_field_points, 20);
        assert_eq!(q.score, 100);
        assert_eq!(q.level, QualityLevel::Excellent);
    }

    #[test]
    fn levels() {
        assert_eq!(QualityLevel::from_score(80), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(79), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(40), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(39), QualityLevel::Poor);
    }
}
