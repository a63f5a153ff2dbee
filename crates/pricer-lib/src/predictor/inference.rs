//! Model inference
//!
//! [`OnnxRegressor`] runs exported ONNX graphs through tract. [`DualModelPredictor`]
//! evaluates the primary and secondary artifacts for one request and tracks
//! inference timing.

use super::artifact::ModelArtifact;
use super::schema::FeatureVector;
use super::Regressor;
use crate::error::Result;
use crate::models::RawPredictions;
use anyhow::Context;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum latency for evaluating both models before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regressor taking a `f32[1, n]` input and producing one value
pub struct OnnxRegressor {
    model: TractModel,
    n_features: usize,
}

impl OnnxRegressor {
    pub fn from_bytes(model_bytes: &[u8], n_features: usize) -> anyhow::Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { model, n_features })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        if features.len() != self.n_features {
            anyhow::bail!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            );
        }
        let data: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)?.into();

        let result = self.model.run(tvec!(input.into()))?;
        let output = result.first().context("No output from model")?;
        let view = output.to_array_view::<f32>()?;
        let value = view.iter().next().copied().context("Model output is empty")?;
        Ok(f64::from(value))
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}

/// Inference statistics
#[derive(Debug, Clone)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}

/// Evaluates the primary and secondary artifacts for each request
#[derive(Debug)]
pub struct DualModelPredictor {
    primary: Arc<ModelArtifact>,
    secondary: Arc<ModelArtifact>,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl DualModelPredictor {
    pub fn new(primary: Arc<ModelArtifact>, secondary: Arc<ModelArtifact>) -> Self {
        Self {
            primary,
            secondary,
            inference_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        }
    }

    pub fn primary(&self) -> &Arc<ModelArtifact> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<ModelArtifact> {
        &self.secondary
    }

    /// Evaluate both models. Either failure fails the whole call.
    pub fn predict(
        &self,
        primary_features: &FeatureVector,
        secondary_features: &FeatureVector,
    ) -> Result<RawPredictions> {
        let start = Instant::now();

        let primary = self.primary.evaluate(primary_features)?;
        let secondary = self.secondary.evaluate(secondary_features)?;

        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(RawPredictions { primary, secondary })
    }

    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}
