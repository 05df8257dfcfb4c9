use serde::{Deserialize, Serialize};

use crate::model::PropertyData;

const MAX_IMAGE_POINTS: usize = 12;
const MAX_FEATURE_POINTS: usize = 10;
const DESCRIPTION_MIN_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCompleteness {
    pub score: u8,
    pub missing: Vec<String>,
}

pub fn score(p: &PropertyData) -> DataCompleteness {
    let mut points = 0usize;
    let mut missing = Vec::new();
    let mut check = |present: bool, pts: usize, name: &str| {
        if present {
            points += pts;
        } else {
            missing.push(name.to_string());
        }
    };

    check(p.known_price().is_some(), 15, "price");
    check(p.known_area().is_some(), 15, "area");
    check(p.known_location().is_some(), 15, "location");
    check(p.known_rooms().is_some(), 8, "rooms");
    check(p.known_bathrooms().is_some(), 7, "bathrooms");
    check(!p.images.is_empty(), p.images.len().min(MAX_IMAGE_POINTS), "images");
    check(p.description_len() > DESCRIPTION_MIN_CHARS, 10, "description");
    check(!p.features.is_empty(), p.features.len().min(MAX_FEATURE_POINTS), "features");
    check(p.coordinates.is_some(), 5, "coordinates");
    check(!p.title.trim().is_empty(), 3, "title");

    DataCompleteness {
        score: points.min(100) as u8,
        missing,
    }
}

// ── Tests ──
