//! Feature encoding for model inference
//!
//! Turns a coerced [`RequestInput`] into one vector per model schema. Numeric
//! attributes land only in columns the schema has; categorical attributes
//! become one-hot indicator columns named `<prefix><literal value>`.

use super::schema::{FeatureSchema, FeatureVector};
use crate::models::RequestInput;
use std::sync::Arc;

/// Column names produced by the encoder
pub mod columns {
    pub const ACCOMMODATES: &str = "accommodates";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms_count";
    pub const AMENITIES: &str = "amenities_count";
    pub const AVAILABLE: &str = "available";

    /// Prefix of neighborhood indicator columns
    pub const NEIGHBORHOOD_PREFIX: &str = "neighbourhood_cleansed_";
    /// Prefix of room type indicator columns
    pub const ROOM_TYPE_PREFIX: &str = "room_type_";
}

/// Encodes request attributes against model schemas
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a request for a single schema
    pub fn encode(&self, input: &RequestInput, schema: &Arc<FeatureSchema>) -> FeatureVector {
        let mut vector = FeatureVector::zeros(schema);

        vector.set(columns::ACCOMMODATES, f64::from(input.accommodates));
        vector.set(columns::BEDROOMS, f64::from(input.bedrooms));
        vector.set(columns::BATHROOMS, input.bathrooms.abs());
        vector.set(columns::AMENITIES, f64::from(input.amenities));
        vector.set(
            columns::AVAILABLE,
            if input.is_available { 1.0 } else { 0.0 },
        );

        if let Some(column) = indicator(columns::NEIGHBORHOOD_PREFIX, input.neighborhood.as_deref()) {
            vector.set(&column, 1.0);
        }
        if let Some(column) = indicator(columns::ROOM_TYPE_PREFIX, input.room_type.as_deref()) {
            vector.set(&column, 1.0);
        }

        vector
    }

    /// Encode a request for the primary and secondary schemas
    pub fn encode_pair(
        &self,
        input: &RequestInput,
        primary: &Arc<FeatureSchema>,
        secondary: &Arc<FeatureSchema>,
    ) -> (FeatureVector, FeatureVector) {
        (self.encode(input, primary), self.encode(input, secondary))
    }
}

fn indicator(prefix: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("{}{}", prefix, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<FeatureSchema> {
        Arc::new(
            FeatureSchema::new([
                "accommodates",
                "bedrooms",
                "bathrooms_count",
                "amenities_count",
                "available",
                "neighbourhood_cleansed_San Jose",
                "neighbourhood_cleansed_Palo Alto",
                "room_type_Entire home/apt",
                "room_type_Private room",
            ])
            .unwrap(),
        )
    }

    fn request() -> RequestInput {
        RequestInput {
            accommodates: 4,
            bedrooms: 2,
            bathrooms: 1.5,
            amenities: 30,
            neighborhood: Some("San Jose".to_string()),
            room_type: Some("Private room".to_string()),
            ..RequestInput::default()
        }
    }

    #[test]
    fn test_numeric_columns_populated() {
        let v = FeatureEncoder::new().encode(&request(), &schema());
        assert_eq!(v.get("accommodates"), Some(4.0));
        assert_eq!(v.get("bedrooms"), Some(2.0));
        assert_eq!(v.get("bathrooms_count"), Some(1.5));
        assert_eq!(v.get("amenities_count"), Some(30.0));
        assert_eq!(v.get("available"), Some(1.0));
    }

    #[test]
    fn test_one_indicator_per_category() {
        let v = FeatureEncoder::new().encode(&request(), &schema());
        assert_eq!(v.get("neighbourhood_cleansed_San Jose"), Some(1.0));
        assert_eq!(v.get("neighbourhood_cleansed_Palo Alto"), Some(0.0));
        assert_eq!(v.get("room_type_Private room"), Some(1.0));
        assert_eq!(v.get("room_type_Entire home/apt"), Some(0.0));

        let hot: f64 = v
            .iter()
            .filter(|(c, _)| c.starts_with(columns::NEIGHBORHOOD_PREFIX))
            .map(|(_, x)| x)
            .sum();
        assert_eq!(hot, 1.0);
    }

    #[test]
    fn test_unknown_categories_set_nothing() {
        let input = RequestInput {
            neighborhood: Some("Atlantis".to_string()),
            room_type: Some("Treehouse".to_string()),
            ..request()
        };
        let v = FeatureEncoder::new().encode(&input, &schema());
        let indicators: f64 = v
            .iter()
            .filter(|(c, _)| {
                c.starts_with(columns::NEIGHBORHOOD_PREFIX) || c.starts_with(columns::ROOM_TYPE_PREFIX)
            })
            .map(|(_, x)| x)
            .sum();
        assert_eq!(indicators, 0.0);
        assert_eq!(v.values().len(), schema().len());
    }

    #[test]
    fn test_missing_columns_are_skipped() {
        let narrow = Arc::new(FeatureSchema::new(["accommodates", "bedrooms"]).unwrap());
        let v = FeatureEncoder::new().encode(&request(), &narrow);
        assert_eq!(v.values(), &[4.0, 2.0]);
    }

    #[test]
    fn test_unavailable_flag() {
        let input = RequestInput {
            is_available: false,
            ..request()
        };
        let v = FeatureEncoder::new().encode(&input, &schema());
        assert_eq!(v.get("available"), Some(0.0));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = FeatureEncoder::new();
        let s = schema();
        for _ in 0..3 {
            assert_eq!(encoder.encode(&request(), &s), encoder.encode(&request(), &s));
        }
    }

    #[test]
    fn test_pair_uses_each_schema() {
        let primary = schema();
        let secondary = Arc::new(FeatureSchema::new(["amenities_count", "accommodates"]).unwrap());
        let (a, b) = FeatureEncoder::new().encode_pair(&request(), &primary, &secondary);
        assert_eq!(a.values().len(), primary.len());
        assert_eq!(b.values(), &[30.0, 4.0]);
    }
}
