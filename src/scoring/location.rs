use serde::{Deserialize, Serialize};

use crate::model::PropertyData;

const BASELINE: u16 = 50;
const CITY_POINTS: u16 = 10;
const FEATURE_POINTS: u16 = 5;

const CENTRE_WORDS: &[&str] = &["centro", "center", "centre", "baixa", "downtown"];
const COASTAL_WORDS: &[&str] = &["praia", "beach", "litoral", "coast", "costa", "seaside"];
const HISTORIC_WORDS: &[&str] = &[
    "histórico",
    "historico",
    "historic",
    "alfama",
    "ribeira",
    "old town",
];
const CITIES: &[&str] = &[
    "lisboa", "lisbon", "porto", "braga", "coimbra", "faro", "aveiro", "funchal",
    "cascais", "sintra", "setúbal", "setubal", "évora", "evora", "leiria", "guimarães",
];

pub(crate) const PARKING_WORDS: &[&str] = &["parking", "estacionamento", "garagem", "garage"];
pub(crate) const POOL_WORDS: &[&str] = &["piscina", "pool"];
pub(crate) const GARDEN_WORDS: &[&str] = &["jardim", "garden"];
pub(crate) const VIEW_WORDS: &[&str] = &["vista", "view"];
const TRANSPORT_WORDS: &[&str] = &["transporte", "transport", "metro", "comboio", "train"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Centre,
    Coastal,
    Historic,
}

impl AreaType {
    fn detect(location: &str) -> Option<Self> {
        let lower = location.to_lowercase();
        let hit = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if hit(CENTRE_WORDS) {
            Some(AreaType::Centre)
        } else if hit(COASTAL_WORDS) {
            Some(AreaType::Coastal)
        } else if hit(HISTORIC_WORDS) {
            Some(AreaType::Historic)
        } else {
            None
        }
    }

    fn points(&self) -> u16 {
        match self {
            AreaType::Centre => 20,
            AreaType::Coastal => 25,
            AreaType::Historic => 15,
        }
    }

    fn transport_base(&self) -> u16 {
        match self {
            AreaType::Centre => 80,
            AreaType::Coastal | AreaType::Historic => 60,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AreaType::Centre => "City center location",
            AreaType::Coastal => "Coastal location",
            AreaType::Historic => "Historic area",
        }
    }
}

/// Narrative-only signal; it does not feed the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContext {
    pub score: u8,
    pub data_available: bool,
    pub area_type: Option<AreaType>,
    pub neighborhood: String,
    pub amenities: Vec<String>,
    pub transport_score: u8,
}

pub fn score(p: &PropertyData) -> LocationContext {
    let Some(location) = p.known_location() else {
        return LocationContext {
            score: 0,
            data_available: false,
            area_type: None,
            neighborhood: "Location data not available".into(),
            amenities: Vec::new(),
            transport_score: 0,
        };
    };

    let area_type = AreaType::detect(location);
    let lower = location.to_lowercase();
    let mut score = BASELINE;
    let mut transport = BASELINE;
    let mut amenities = Vec::new();

    if let Some(t) = area_type {
        score += t.points();
        transport = t.transport_base();
    }
    if CITIES.iter().any(|c| lower.contains(c)) {
        score += CITY_POINTS;
    }

    let keyed = [
        (PARKING_WORDS, "Parking available"),
        (POOL_WORDS, "Swimming pool"),
        (GARDEN_WORDS, "Garden"),
        (VIEW_WORDS, "Views"),
    ];
    for (words, label) in keyed {
        if p.has_feature(words) {
            score += FEATURE_POINTS;
            amenities.push(label.to_string());
        }
    }
    if p.has_feature(PARKING_WORDS) {
        transport += 10;
    }
    if p.has_feature(TRANSPORT_WORDS) {
        transport += 15;
        amenities.push("Public transport access".to_string());
    }

    let neighborhood = match area_type {
        Some(t) => t.label().to_string(),
        None => location
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Standard residential area")
            .to_string(),
    };

    LocationContext {
        score: score.min(100) as u8,
        data_available: true,
        area_type,
        neighborhood,
        amenities,
        transport_score: transport.min(100) as u8,
    }
}

// ── Tests ──
