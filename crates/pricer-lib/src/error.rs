//! Error types for the pricing pipeline

use thiserror::Error;

/// Result type for pricing operations.
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors that can occur while loading artifacts or quoting a price.
///
/// Everything except [`PricingError::ArtifactLoad`] is request scoped and is
/// turned into a failure response at the HTTP boundary.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The request payload could not be parsed even with defaulting
    #[error("Invalid request payload: {0}")]
    InputCoercion(String),

    /// An encoded vector does not line up with the model's schema
    #[error("Feature vector does not match schema of model '{model}': {reason}")]
    SchemaMismatch {
        /// Model whose schema was violated
        model: String,
        /// What did not line up
        reason: String,
    },

    /// The inference call itself failed
    #[error("Model '{model}' failed to evaluate: {reason}")]
    ModelEvaluation {
        /// Model that failed
        model: String,
        /// Underlying failure
        reason: String,
    },

    /// A model artifact could not be read or parsed
    #[error("Failed to load model artifact {path}: {reason}")]
    ArtifactLoad {
        /// Location of the artifact
        path: String,
        /// Underlying failure
        reason: String,
    },
}

impl PricingError {
    /// Stable label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::InputCoercion(_) => "input_coercion",
            PricingError::SchemaMismatch { .. } => "schema_mismatch",
            PricingError::ModelEvaluation { .. } => "model_evaluation",
            PricingError::ArtifactLoad { .. } => "artifact_load",
        }
    }

    /// True for errors confined to a single request
    pub fn is_request_scoped(&self) -> bool {
        !matches!(self, PricingError::ArtifactLoad { .. })
    }

    pub(crate) fn evaluation(model: &str, reason: impl std::fmt::Display) -> Self {
        PricingError::ModelEvaluation {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn artifact(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        PricingError::ArtifactLoad {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
