//! Core data models for the pricing pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of guests when the request omits `acc`
pub const DEFAULT_ACCOMMODATES: u32 = 0;
/// Default bedroom count when the request omits `bed`
pub const DEFAULT_BEDROOMS: u32 = 0;
/// Default bathroom count when the request omits `bath`
pub const DEFAULT_BATHROOMS: f64 = 1.0;
/// Default amenity count when the request omits `amenities`
pub const DEFAULT_AMENITIES: u32 = 15;
/// Default calendar month when the request omits `month`
pub const DEFAULT_MONTH: u32 = 1;

/// Property attributes for a single quote, after defaulting and coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestInput {
    pub accommodates: u32,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub amenities: u32,
    pub neighborhood: Option<String>,
    pub room_type: Option<String>,
    /// Calendar month, always within 1..=12
    pub month: u32,
    pub is_weekend: bool,
    pub is_available: bool,
}

impl Default for RequestInput {
    fn default() -> Self {
        Self {
            accommodates: DEFAULT_ACCOMMODATES,
            bedrooms: DEFAULT_BEDROOMS,
            bathrooms: DEFAULT_BATHROOMS,
            amenities: DEFAULT_AMENITIES,
            neighborhood: None,
            room_type: None,
            month: DEFAULT_MONTH,
            is_weekend: false,
            is_available: true,
        }
    }
}

/// Seasonal demand bucket derived from the calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonBucket {
    /// June, July, August and December
    Peak,
    /// March to May, September and October
    Moderate,
    /// January, February and November
    OffSeason,
}

impl SeasonBucket {
    pub fn from_month(month: u32) -> Self {
        match month {
            6 | 7 | 8 | 12 => SeasonBucket::Peak,
            3 | 4 | 5 | 9 | 10 => SeasonBucket::Moderate,
            _ => SeasonBucket::OffSeason,
        }
    }

    /// Multiplier increment contributed by this bucket
    pub fn uplift(&self) -> f64 {
        match self {
            SeasonBucket::Peak => 0.25,
            SeasonBucket::Moderate => 0.10,
            SeasonBucket::OffSeason => 0.05,
        }
    }
}

/// Coarse market tier of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Luxury Class")]
    Luxury,
    #[serde(rename = "Standard Class")]
    Standard,
    #[serde(rename = "Economy Class")]
    Economy,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Luxury => "Luxury Class",
            Tier::Standard => "Standard Class",
            Tier::Economy => "Economy Class",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-feature impact scores shown next to a quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactBreakdown {
    #[serde(rename = "Size")]
    pub size: f64,
    #[serde(rename = "Beds")]
    pub beds: f64,
    #[serde(rename = "Baths")]
    pub baths: f64,
    #[serde(rename = "Amenities")]
    pub amenities: f64,
}

/// Raw outputs of the two regressors for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPredictions {
    /// Primary (random forest) model output
    pub primary: f64,
    /// Secondary (gradient boosted) model output
    pub secondary: f64,
}

/// Blended price with its display range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendedPrice {
    pub base: f64,
    pub multiplier: f64,
    pub season: SeasonBucket,
    pub price: f64,
    pub low: f64,
    pub high: f64,
}

/// Everything produced for a single quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub raw: RawPredictions,
    pub blended: BlendedPrice,
    pub tier: Tier,
    pub impact: ImpactBreakdown,
    pub insights: Vec<String>,
}
