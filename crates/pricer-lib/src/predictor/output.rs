//! Post-processing of raw model outputs
//!
//! Blends the two raw predictions into a nightly price with its display
//! range, classifies the market tier and derives per-feature impact scores.

use super::features::columns;
use crate::models::{BlendedPrice, ImpactBreakdown, RawPredictions, RequestInput, SeasonBucket, Tier};
use std::collections::HashMap;

/// Multiplier increment for weekend stays
pub const WEEKEND_UPLIFT: f64 = 0.15;

/// Multiplier decrement when the listing is unavailable
pub const UNAVAILABLE_PENALTY: f64 = 0.05;

/// Lower bound of the displayed range relative to the final price
pub const RANGE_LOW_FACTOR: f64 = 0.90;

/// Upper bound of the displayed range relative to the final price
pub const RANGE_HIGH_FACTOR: f64 = 1.10;

/// Raw secondary predictions above this are Luxury
pub const LUXURY_THRESHOLD: f64 = 450.0;

/// Raw secondary predictions above this (up to Luxury) are Standard
pub const STANDARD_THRESHOLD: f64 = 200.0;

/// Importance assumed for columns the model does not report
pub const DEFAULT_IMPORTANCE: f64 = 0.1;

/// Scale applied to `input × importance`
pub const IMPACT_SCALE: f64 = 10.0;

/// Multiplier from the seasonal bucket, weekend flag and availability
pub fn price_multiplier(season: SeasonBucket, is_weekend: bool, is_available: bool) -> f64 {
    let mut multiplier = 1.0 + season.uplift();
    if is_weekend {
        multiplier += WEEKEND_UPLIFT;
    }
    if !is_available {
        multiplier -= UNAVAILABLE_PENALTY;
    }
    multiplier
}

/// Average the raw predictions and apply the calendar multiplier.
///
/// The result is intentionally not clamped; negative model outputs pass
/// through to the caller.
pub fn blend_price(raw: &RawPredictions, month: u32, is_weekend: bool, is_available: bool) -> BlendedPrice {
    let season = SeasonBucket::from_month(month);
    let base = (raw.primary + raw.secondary) / 2.0;
    let multiplier = price_multiplier(season, is_weekend, is_available);
    let price = base * multiplier;

    BlendedPrice {
        base,
        multiplier,
        season,
        price,
        low: price * RANGE_LOW_FACTOR,
        high: price * RANGE_HIGH_FACTOR,
    }
}

/// Tier of a raw (unblended) secondary prediction
pub fn classify_tier(raw_secondary: f64) -> Tier {
    if raw_secondary > LUXURY_THRESHOLD {
        Tier::Luxury
    } else if raw_secondary > STANDARD_THRESHOLD {
        Tier::Standard
    } else {
        Tier::Economy
    }
}

/// Linear impact heuristic over the four numeric inputs.
///
/// Not an additive decomposition of the price.
pub fn attribute_impact(importances: &HashMap<String, f64>, input: &RequestInput) -> ImpactBreakdown {
    let score = |value: f64, column: &str| {
        let weight = importances.get(column).copied().unwrap_or(DEFAULT_IMPORTANCE);
        round_cents(value * weight * IMPACT_SCALE)
    };

    ImpactBreakdown {
        size: score(f64::from(input.accommodates), columns::ACCOMMODATES),
        beds: score(f64::from(input.bedrooms), columns::BEDROOMS),
        baths: score(input.bathrooms, columns::BATHROOMS),
        amenities: score(f64::from(input.amenities), columns::AMENITIES),
    }
}

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_blend_peak_weekend() {
        let raw = RawPredictions {
            primary: 300.0,
            secondary: 320.0,
        };
        let blended = blend_price(&raw, 7, true, true);
        assert_eq!(blended.season, SeasonBucket::Peak);
        assert!(approx(blended.multiplier, 1.40));
        assert!(approx(blended.base, 310.0));
        assert!(approx(blended.price, 434.0));
        assert!(approx(blended.low, 390.6));
        assert!(approx(blended.high, 477.4));
    }

    #[test]
    fn test_multiplier_terms_stack() {
        assert!(approx(price_multiplier(SeasonBucket::OffSeason, false, true), 1.05));
        assert!(approx(price_multiplier(SeasonBucket::Moderate, false, true), 1.10));
        assert!(approx(price_multiplier(SeasonBucket::Moderate, true, false), 1.20));
        assert!(approx(price_multiplier(SeasonBucket::Peak, true, false), 1.35));
    }

    #[test]
    fn test_negative_predictions_are_not_clamped() {
        let raw = RawPredictions {
            primary: -50.0,
            secondary: -10.0,
        };
        let blended = blend_price(&raw, 1, false, false);
        assert!(blended.price < 0.0);
        assert!(approx(blended.price, -30.0));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify_tier(451.0), Tier::Luxury);
        assert_eq!(classify_tier(450.0), Tier::Standard);
        assert_eq!(classify_tier(200.01), Tier::Standard);
        assert_eq!(classify_tier(200.0), Tier::Economy);
        assert_eq!(classify_tier(-1.0), Tier::Economy);
    }

    #[test]
    fn test_impact_uses_importances_and_default() {
        let importances = HashMap::from([
            ("accommodates".to_string(), 0.35),
            ("bedrooms".to_string(), 0.12),
        ]);
        let input = RequestInput {
            accommodates: 4,
            bedrooms: 2,
            bathrooms: 1.5,
            amenities: 20,
            ..RequestInput::default()
        };
        let impact = attribute_impact(&importances, &input);
        assert_eq!(impact.size, 14.0);
        assert_eq!(impact.beds, 2.4);
        assert_eq!(impact.baths, 1.5);
        assert_eq!(impact.amenities, 20.0);
    }

    #[test]
    fn test_impact_is_linear_in_amenities() {
        let importances = HashMap::from([("amenities_count".to_string(), 0.0425)]);
        let base = RequestInput {
            amenities: 16,
            ..RequestInput::default()
        };
        let doubled = RequestInput {
            amenities: 32,
            ..RequestInput::default()
        };
        let a = attribute_impact(&importances, &base).amenities;
        let b = attribute_impact(&importances, &doubled).amenities;
        assert!(approx(b, 2.0 * a));
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.234), 1.23);
        assert_eq!(round_cents(1.235_1), 1.24);
        assert_eq!(round_cents(-2.5), -2.5);
    }
}
