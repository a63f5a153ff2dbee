//! Nightly price prediction engine

mod artifact;
mod engine;
mod features;
mod inference;
mod insights;
mod output;
mod schema;
mod tree;

pub use artifact::{compute_checksum, ArtifactInfo, ModelArtifact, SchemaSidecar};
pub use engine::PricingEngine;
pub use features::{columns, FeatureEncoder};
pub use inference::{DualModelPredictor, InferenceStats, OnnxRegressor};
pub use insights::{InsightGenerator, DEFAULT_MARKET_NAME, LUXURY_INSIGHT, WEEKEND_INSIGHT};
pub use output::{
    attribute_impact, blend_price, classify_tier, price_multiplier, round_cents,
    DEFAULT_IMPORTANCE, LUXURY_THRESHOLD, STANDARD_THRESHOLD,
};
pub use schema::{FeatureSchema, FeatureVector};
pub use tree::{Aggregation, Node, SplitRule, Tree, TreeEnsemble, TreeEnsembleDocument};

use anyhow::Result;

/// Trait for trained regression backends
pub trait Regressor: Send + Sync {
    /// Predict a single value from features laid out in schema order
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Short backend label used in logs and metrics
    fn backend(&self) -> &'static str;
}
