use super::completeness::DataCompleteness;
use super::listing::ListingQuality;
use super::location::{LocationContext, GARDEN_WORDS, POOL_WORDS};
use super::quality::DataQuality;
use super::space::{SpaceEfficiency, SpaceRating};
use crate::model::PropertyData;

pub const MAX_RECOMMENDATIONS: usize = 6;
pub const MAX_RISKS: usize = 4;
pub const MAX_OPPORTUNITIES: usize = 4;

const SEA_VIEW_WORDS: &[&str] = &["vista mar", "sea view", "ocean view", "vista para o mar"];
const OUTDOOR_WORDS: &[&str] = &["jardim", "garden", "terraço", "terraco", "terrace"];

pub struct Signals<'a> {
    pub data: &'a PropertyData,
    pub quality: &'a DataQuality,
    pub listing: &'a ListingQuality,
    pub space: &'a SpaceEfficiency,
    pub location: &'a LocationContext,
    pub completeness: &'a DataCompleteness,
}

#[derive(Debug, Default)]
pub struct Narrative {
    pub recommendations: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

pub fn narrate(s: &Signals<'_>) -> Narrative {
    let mut recommendations = recommendations(s);
    let mut risks = risks(s);
    let mut opportunities = opportunities(s);
    recommendations.truncate(MAX_RECOMMENDATIONS);
    risks.truncate(MAX_RISKS);
    opportunities.truncate(MAX_OPPORTUNITIES);
    Narrative {
        recommendations,
        risks,
        opportunities,
    }
}

fn recommendations(s: &Signals<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(ppm2) = s.space.price_per_m2 {
        if ppm2 < 2000.0 {
            out.push(format!(
                "Competitive pricing at €{:.0}/m² - consider moving quickly",
                ppm2
            ));
        } else if ppm2 > 5000.0 {
            out.push(format!(
                "High price at €{:.0}/m² - negotiate or check market comparables",
                ppm2
            ));
        }
    }
    match s.space.space_rating {
        Some(SpaceRating::Spacious) => {
            out.push("Spacious layout - great for families or a home office".to_string())
        }
        Some(SpaceRating::Compact | SpaceRating::Small) => {
            out.push("Compact rooms - verify the space meets your requirements".to_string())
        }
        _ => {}
    }
    if s.location.data_available {
        if s.location.transport_score > 80 {
            out.push("Excellent transport connectivity - ideal for commuters".to_string());
        } else if s.location.transport_score <= 50 {
            out.push("No transport advantages found - consider vehicle access needs".to_string());
        }
    }
    if s.data.has_feature(POOL_WORDS) {
        out.push("Pool maintenance costs should be factored into the budget".to_string());
    }
    if s.data.has_feature(GARDEN_WORDS) {
        out.push("Garden space adds value and lifestyle benefits".to_string());
    }
    if s.listing.score < 40 {
        out.push(
            "The listing is thin on detail - ask the agent for more photos and a full description"
                .to_string(),
        );
    }
    if !s.quality.warnings.is_empty() {
        out.push("Some listed values look unusual - confirm them with the agent".to_string());
    }

    out.push("Verify all property details with official documentation".to_string());
    out.push("Consider future resale potential and market trends".to_string());
    out
}

fn risks(s: &Signals<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if s.quality.has_critical_issues {
        out.push("Price and area are both missing - the listing cannot be valued".to_string());
    }
    if s.space.price_per_m2.is_some_and(|p| p > 6000.0) {
        out.push(
            "Price per m² is well above the market range - may be hard to resell".to_string(),
        );
    }
    if s.space.space_rating == Some(SpaceRating::Small) {
        out.push("Small rooms may limit comfort and buyer interest".to_string());
    }
    if s.data.known_area().is_some_and(|a| a < 50.0) {
        out.push("Very small property may limit the resale market".to_string());
    }
    if s.space.bathroom_ratio.is_some_and(|r| r < 0.5) {
        out.push("Few bathrooms for the number of rooms".to_string());
    }
    if !s.location.data_available {
        out.push("Location not specified - the neighbourhood cannot be assessed".to_string());
    }
    if s.completeness.score < 50 {
        out.push("Incomplete listing data - key details could not be checked".to_string());
    }
    out
}

fn opportunities(s: &Signals<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if s.space.price_per_m2.is_some_and(|p| p < 1500.0) {
        out.push(
            "Price per m² below the usual market range - potential for appreciation".to_string(),
        );
    }
    if s.location.score > 70 {
        out.push("Attractive location with strong rental and resale potential".to_string());
    }
    if s.data.has_feature(POOL_WORDS) || s.data.has_feature(SEA_VIEW_WORDS) {
        out.push("Premium amenities (pool or sea view) support resale value".to_string());
    }
    if s.data.has_feature(OUTDOOR_WORDS) {
        out.push("Outdoor space adds lifestyle and resale value".to_string());
    }
    if s.space.space_rating == Some(SpaceRating::Spacious) {
        out.push("Generous room sizes leave room to reconfigure".to_string());
    }
    out
}
