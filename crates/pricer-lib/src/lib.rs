//! Nightly rate pricing library
//!
//! This crate provides the core functionality for:
//! - Defensive parsing of quote requests
//! - Loading the two trained price models
//! - Feature encoding, dual-model inference and price blending
//! - Tiering, impact attribution and insights
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod input;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::{PricingError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use input::{coerce_request, parse_request_body};
pub use models::*;
pub use observability::{PricerMetrics, StructuredLogger};
pub use predictor::{ModelArtifact, PricingEngine};
