//! Defensive parsing of raw quote requests
//!
//! Request bodies come straight from a browser form, so numeric fields may
//! arrive as numbers, numeric strings, booleans or not at all. Anything that
//! cannot be read as a number falls back to the field's default instead of
//! failing the request. Only payloads that are not key/value data at all are
//! rejected.

use crate::error::{PricingError, Result};
use crate::models::{
    RequestInput, DEFAULT_ACCOMMODATES, DEFAULT_AMENITIES, DEFAULT_BATHROOMS, DEFAULT_BEDROOMS,
    DEFAULT_MONTH,
};
use serde_json::{Map, Value};

/// Request field names
pub mod fields {
    pub const ACCOMMODATES: &str = "acc";
    pub const BEDROOMS: &str = "bed";
    pub const BATHROOMS: &str = "bath";
    pub const AMENITIES: &str = "amenities";
    pub const NEIGHBORHOOD: &str = "neighborhood";
    pub const ROOM_TYPE: &str = "room_type";
    pub const MONTH: &str = "month";
    pub const IS_WEEKEND: &str = "is_weekend";
    pub const AVAILABLE: &str = "available";
    pub const DAY_OF_WEEK: &str = "day_of_week";
}

/// First `day_of_week` value (Monday = 0) that counts as weekend
const FIRST_WEEKEND_DAY: f64 = 5.0;

/// Parse a raw request body. An empty body is treated as `{}`.
pub fn parse_request_body(body: &[u8]) -> Result<RequestInput> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(RequestInput::default());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PricingError::InputCoercion(format!("body is not valid JSON: {}", e)))?;
    coerce_request(&value)
}

/// Coerce a decoded JSON payload into a [`RequestInput`]
pub fn coerce_request(value: &Value) -> Result<RequestInput> {
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(RequestInput::default()),
        other => {
            return Err(PricingError::InputCoercion(format!(
                "expected a JSON object, got {}",
                json_type(other)
            )))
        }
    };

    let month = number(map, fields::MONTH)
        .map(|m| m.trunc())
        .filter(|m| (1.0..=12.0).contains(m))
        .map(|m| m as u32)
        .unwrap_or(DEFAULT_MONTH);

    let is_weekend = match flag(map, fields::IS_WEEKEND) {
        Some(weekend) => weekend,
        None => number(map, fields::DAY_OF_WEEK)
            .map(|d| d.trunc() >= FIRST_WEEKEND_DAY && d.trunc() <= 6.0)
            .unwrap_or(false),
    };

    Ok(RequestInput {
        accommodates: number(map, fields::ACCOMMODATES)
            .map(abs_trunc)
            .unwrap_or(DEFAULT_ACCOMMODATES),
        bedrooms: number(map, fields::BEDROOMS)
            .map(abs_trunc)
            .unwrap_or(DEFAULT_BEDROOMS),
        bathrooms: number(map, fields::BATHROOMS)
            .map(f64::abs)
            .unwrap_or(DEFAULT_BATHROOMS),
        amenities: number(map, fields::AMENITIES)
            .map(abs_trunc)
            .unwrap_or(DEFAULT_AMENITIES),
        neighborhood: category(map, fields::NEIGHBORHOOD)?,
        room_type: category(map, fields::ROOM_TYPE)?,
        month,
        is_weekend,
        is_available: flag(map, fields::AVAILABLE).unwrap_or(true),
    })
}

/// Absolute value of the truncated input, saturating at `u32::MAX`
fn abs_trunc(value: f64) -> u32 {
    value.trunc().abs() as u32
}

fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn flag(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => number(map, key).map(|v| v != 0.0),
        },
        _ => number(map, key).map(|v| v != 0.0),
    }
}

fn category(map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(PricingError::InputCoercion(format!(
            "field '{}' must be a string, got {}",
            key,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_uses_defaults() {
        assert_eq!(parse_request_body(b"").unwrap(), RequestInput::default());
        assert_eq!(parse_request_body(b"  \n").unwrap(), RequestInput::default());
        assert_eq!(parse_request_body(b"{}").unwrap(), RequestInput::default());
        assert_eq!(parse_request_body(b"null").unwrap(), RequestInput::default());
    }

    #[test]
    fn test_full_request() {
        let input = coerce_request(&json!({
            "acc": 4, "bed": 2, "bath": 2, "amenities": 20,
            "neighborhood": "Downtown", "room_type": "Entire home",
            "month": 7, "is_weekend": 1, "available": 1
        }))
        .unwrap();

        assert_eq!(input.accommodates, 4);
        assert_eq!(input.bedrooms, 2);
        assert_eq!(input.bathrooms, 2.0);
        assert_eq!(input.amenities, 20);
        assert_eq!(input.neighborhood.as_deref(), Some("Downtown"));
        assert_eq!(input.room_type.as_deref(), Some("Entire home"));
        assert_eq!(input.month, 7);
        assert!(input.is_weekend);
        assert!(input.is_available);
    }

    #[test]
    fn test_negative_counts_become_positive() {
        let input = coerce_request(&json!({"acc": -3.7, "bed": "-2", "bath": -1.5, "amenities": -8})).unwrap();
        assert_eq!(input.accommodates, 3);
        assert_eq!(input.bedrooms, 2);
        assert_eq!(input.bathrooms, 1.5);
        assert_eq!(input.amenities, 8);
    }

    #[test]
    fn test_non_numeric_values_fall_back_to_defaults() {
        let input = coerce_request(&json!({
            "acc": "many", "bed": [1], "bath": {"n": 2}, "amenities": "", "month": "July"
        }))
        .unwrap();
        assert_eq!(input.accommodates, DEFAULT_ACCOMMODATES);
        assert_eq!(input.bedrooms, DEFAULT_BEDROOMS);
        assert_eq!(input.bathrooms, DEFAULT_BATHROOMS);
        assert_eq!(input.amenities, DEFAULT_AMENITIES);
        assert_eq!(input.month, DEFAULT_MONTH);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let input = coerce_request(&json!({"acc": " 5 ", "bath": "1.5", "month": "12"})).unwrap();
        assert_eq!(input.accommodates, 5);
        assert_eq!(input.bathrooms, 1.5);
        assert_eq!(input.month, 12);
    }

    #[test]
    fn test_out_of_range_month_uses_default() {
        assert_eq!(coerce_request(&json!({"month": 13})).unwrap().month, DEFAULT_MONTH);
        assert_eq!(coerce_request(&json!({"month": 0})).unwrap().month, DEFAULT_MONTH);
        assert_eq!(coerce_request(&json!({"month": 6.9})).unwrap().month, 6);
    }

    #[test]
    fn test_flags() {
        let input = coerce_request(&json!({"is_weekend": "1", "available": "0"})).unwrap();
        assert!(input.is_weekend);
        assert!(!input.is_available);

        let input = coerce_request(&json!({"is_weekend": true, "available": false})).unwrap();
        assert!(input.is_weekend);
        assert!(!input.is_available);
    }

    #[test]
    fn test_weekend_derived_from_day_of_week() {
        assert!(coerce_request(&json!({"day_of_week": 5})).unwrap().is_weekend);
        assert!(coerce_request(&json!({"day_of_week": 6})).unwrap().is_weekend);
        assert!(!coerce_request(&json!({"day_of_week": 2})).unwrap().is_weekend);
        // explicit flag wins
        assert!(!coerce_request(&json!({"day_of_week": 6, "is_weekend": 0})).unwrap().is_weekend);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert!(matches!(
            parse_request_body(b"{not json"),
            Err(PricingError::InputCoercion(_))
        ));
        assert!(matches!(
            coerce_request(&json!([1, 2, 3])),
            Err(PricingError::InputCoercion(_))
        ));
        assert!(matches!(
            coerce_request(&json!({"neighborhood": ["a", "b"]})),
            Err(PricingError::InputCoercion(_))
        ));
    }

    #[test]
    fn test_scalar_categories_are_stringified() {
        let input = coerce_request(&json!({"neighborhood": 95050})).unwrap();
        assert_eq!(input.neighborhood.as_deref(), Some("95050"));
    }
}
