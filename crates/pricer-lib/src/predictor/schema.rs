//! Feature schemas and the vectors built against them
//!
//! A schema is fixed when its model is loaded and shared by every request.
//! Column lookups go through a precomputed index instead of scanning the
//! column list per request.

use crate::error::{PricingError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered, immutable list of input columns expected by one model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicate column names
    pub fn new<I, S>(columns: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(format!("duplicate column '{}'", name));
            }
        }
        Ok(Self { columns, index })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

/// Numeric inputs for one (request, model) pair, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector covering every column of `schema`
    pub fn zeros(schema: &Arc<FeatureSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: vec![0.0; schema.len()],
        }
    }

    /// Set a column if the schema has it. Returns whether it was written.
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match self.schema.position(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Verify that this vector was built for `schema`
    pub fn check_against(&self, schema: &FeatureSchema, model: &str) -> Result<()> {
        let mismatch = |reason: String| PricingError::SchemaMismatch {
            model: model.to_string(),
            reason,
        };

        if self.values.len() != schema.len() {
            return Err(mismatch(format!(
                "vector has {} values, schema has {} columns",
                self.values.len(),
                schema.len()
            )));
        }
        if std::ptr::eq(self.schema.as_ref(), schema) {
            return Ok(());
        }
        if let Some((got, want)) = self
            .schema
            .columns()
            .iter()
            .zip(schema.columns())
            .find(|(got, want)| got != want)
        {
            return Err(mismatch(format!("column '{}' where '{}' was expected", got, want)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(cols: &[&str]) -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(cols.iter().copied()).unwrap())
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = FeatureSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(err.contains("'a'"));
    }

    #[test]
    fn test_zero_vector_matches_schema_order() {
        let s = schema(&["accommodates", "bedrooms", "room_type_Private room"]);
        let v = FeatureVector::zeros(&s);
        let cols: Vec<_> = v.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["accommodates", "bedrooms", "room_type_Private room"]);
        assert!(v.values().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_set_ignores_unknown_columns() {
        let s = schema(&["accommodates"]);
        let mut v = FeatureVector::zeros(&s);
        assert!(v.set("accommodates", 3.0));
        assert!(!v.set("bathrooms_count", 2.0));
        assert_eq!(v.get("accommodates"), Some(3.0));
        assert_eq!(v.get("bathrooms_count"), None);
        assert_eq!(v.values().len(), 1);
    }

    #[test]
    fn test_check_against_same_schema() {
        let s = schema(&["a", "b"]);
        let v = FeatureVector::zeros(&s);
        assert!(v.check_against(&s, "rf").is_ok());

        // equal columns from a separately loaded schema are fine too
        let copy = FeatureSchema::new(["a", "b"]).unwrap();
        assert!(v.check_against(&copy, "rf").is_ok());
    }

    #[test]
    fn test_check_against_detects_mismatch() {
        let v = FeatureVector::zeros(&schema(&["a", "b"]));

        let shorter = FeatureSchema::new(["a"]).unwrap();
        assert!(matches!(
            v.check_against(&shorter, "xgb"),
            Err(PricingError::SchemaMismatch { .. })
        ));

        let reordered = FeatureSchema::new(["b", "a"]).unwrap();
        assert!(matches!(
            v.check_against(&reordered, "xgb"),
            Err(PricingError::SchemaMismatch { .. })
        ));
    }
}
