use serde::{Deserialize, Serialize};

use crate::model::PropertyData;

const PRICE_RANGE: (f64, f64) = (1_000.0, 10_000_000.0);
const AREA_RANGE: (f64, f64) = (20.0, 1_000.0);
const PRICE_PER_M2_RANGE: (f64, f64) = (200.0, 15_000.0);
const MIN_AREA_PER_ROOM: f64 = 12.0;
const MIN_PHOTOS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub has_critical_issues: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Data-quality gate. Critical only when price and area are both unknown.
pub fn assess(p: &PropertyData) -> DataQuality {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let price = p.known_price();
    let area = p.known_area();
    if price.is_none() {
        issues.push("Missing or invalid price".to_string());
    }
    if area.is_none() {
        issues.push("Missing or invalid area".to_string());
    }

    if let Some(price) = price {
        if price < PRICE_RANGE.0 {
            warnings.push(format!("Price seems unusually low (€{:.0})", price));
        } else if price > PRICE_RANGE.1 {
            warnings.push(format!("Price seems unusually high (€{:.0})", price));
        }
    }
    if let Some(area) = area {
        if area < AREA_RANGE.0 {
            warnings.push(format!("Area seems unusually small ({:.0} m²)", area));
        } else if area > AREA_RANGE.1 {
            warnings.push(format!("Area seems unusually large ({:.0} m²)", area));
        }
    }
    if let Some(ppm2) = p.price_per_m2() {
        if ppm2 < PRICE_PER_M2_RANGE.0 || ppm2 > PRICE_PER_M2_RANGE.1 {
            warnings.push(format!(
                "Price per m² (€{:.0}) is outside the expected range",
                ppm2
            ));
        }
    }
    if let Some(apr) = p.area_per_room() {
        if apr < MIN_AREA_PER_ROOM {
            warnings.push(format!("Very little area per room ({:.1} m²)", apr));
        }
    }

    if p.known_rooms().is_none() {
        warnings.push("Number of rooms not specified".to_string());
    }
    if p.known_bathrooms().is_none() {
        warnings.push("Number of bathrooms not specified".to_string());
    }
    if p.features.is_empty() {
        warnings.push("No features listed".to_string());
    }
    match p.images.len() {
        0 => warnings.push("No photos available".to_string()),
        n if n < MIN_PHOTOS => warnings.push(format!("Only {} photo(s) available", n)),
        _ => {}
    }
    if p.description_len() < MIN_DESCRIPTION_CHARS {
        warnings.push("Description is missing or very short".to_string());
    }

    DataQuality {
        has_critical_issues: price.is_none() && area.is_none(),
        issues,
        warnings,
    }
}

// ── Tests ──
