//! Request-time pricing pipeline
//!
//! Encoder → dual model predictor → blender / tier / impact → insights.
//! Each quote runs synchronously on the caller's thread and either returns a
//! complete [`PredictionResult`] or fails as a whole.

use super::artifact::{ArtifactInfo, ModelArtifact};
use super::features::FeatureEncoder;
use super::inference::{DualModelPredictor, InferenceStats};
use super::insights::InsightGenerator;
use super::output::{attribute_impact, blend_price, classify_tier};
use crate::error::Result;
use crate::models::{PredictionResult, RequestInput};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Owns the two loaded artifacts and runs the pricing pipeline
#[derive(Debug)]
pub struct PricingEngine {
    encoder: FeatureEncoder,
    predictor: DualModelPredictor,
    insights: InsightGenerator,
}

impl PricingEngine {
    /// Build an engine around already loaded artifacts.
    ///
    /// `primary` supplies the importance weights and the `rf` figure;
    /// `secondary` drives tier classification.
    pub fn new(
        primary: Arc<ModelArtifact>,
        secondary: Arc<ModelArtifact>,
        insights: InsightGenerator,
    ) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            predictor: DualModelPredictor::new(primary, secondary),
            insights,
        }
    }

    /// Load both artifacts from disk. Any failure here is fatal for startup.
    pub fn load(primary_path: &Path, secondary_path: &Path, market_name: &str) -> Result<Self> {
        let primary = ModelArtifact::load(primary_path)?;
        debug!(
            model = %primary.name(),
            path = %primary_path.display(),
            columns = primary.schema().len(),
            "Loaded primary model"
        );
        let secondary = ModelArtifact::load(secondary_path)?;
        debug!(
            model = %secondary.name(),
            path = %secondary_path.display(),
            columns = secondary.schema().len(),
            "Loaded secondary model"
        );
        Ok(Self::new(
            Arc::new(primary),
            Arc::new(secondary),
            InsightGenerator::new(market_name),
        ))
    }

    pub fn primary(&self) -> &Arc<ModelArtifact> {
        self.predictor.primary()
    }

    pub fn secondary(&self) -> &Arc<ModelArtifact> {
        self.predictor.secondary()
    }

    /// Provenance of the primary and secondary artifacts
    pub fn model_infos(&self) -> [&ArtifactInfo; 2] {
        [self.primary().info(), self.secondary().info()]
    }

    /// Price a single request
    pub fn quote(&self, input: &RequestInput) -> Result<PredictionResult> {
        let (primary_features, secondary_features) = self.encoder.encode_pair(
            input,
            self.primary().schema(),
            self.secondary().schema(),
        );

        let raw = self.predictor.predict(&primary_features, &secondary_features)?;

        let blended = blend_price(&raw, input.month, input.is_weekend, input.is_available);
        let tier = classify_tier(raw.secondary);
        let impact = attribute_impact(self.primary().importances(), input);
        let insights = self.insights.generate(blended.season, input.is_weekend, tier);

        debug!(
            primary = raw.primary,
            secondary = raw.secondary,
            multiplier = blended.multiplier,
            price = blended.price,
            tier = %tier,
            "Quote computed"
        );

        Ok(PredictionResult {
            raw,
            blended,
            tier,
            impact,
            insights,
        })
    }

    /// Inference counts and slow evaluations since startup
    pub fn stats(&self) -> InferenceStats {
        self.predictor.stats()
    }
}
