//! Observability for the pricing service
//!
//! Provides:
//! - Prometheus metrics (quote latency, quote and failure counts, tier mix, loaded models)
//! - Structured JSON logging with tracing

use crate::error::PricingError;
use crate::models::{PredictionResult, RequestInput};
use crate::predictor::{ArtifactInfo, InferenceStats};
use prometheus::{
    register_gauge, register_gauge_vec, register_histogram, register_int_counter,
    register_int_counter_vec, register_int_gauge, Gauge, GaugeVec, Histogram, IntCounter,
    IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for quote latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PricerMetricsInner> = OnceLock::new();

struct PricerMetricsInner {
    quote_latency_seconds: Histogram,
    quotes_total: IntCounter,
    quote_errors_total: IntCounterVec,
    quotes_by_tier_total: IntCounterVec,
    last_quoted_price: Gauge,
    model_info: GaugeVec,
    inferences_total: IntGauge,
    slow_inferences_total: IntGauge,
}

impl PricerMetricsInner {
    fn new() -> Self {
        Self {
            quote_latency_seconds: register_histogram!(
                "pricer_quote_latency_seconds",
                "Time spent encoding, evaluating and post-processing a quote",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register quote_latency_seconds"),

            quotes_total: register_int_counter!(
                "pricer_quotes_total",
                "Total number of successful quotes"
            )
            .expect("Failed to register quotes_total"),

            quote_errors_total: register_int_counter_vec!(
                "pricer_quote_errors_total",
                "Total number of failed quotes by error kind",
                &["kind"]
            )
            .expect("Failed to register quote_errors_total"),

            quotes_by_tier_total: register_int_counter_vec!(
                "pricer_quotes_by_tier_total",
                "Successful quotes by market tier",
                &["tier"]
            )
            .expect("Failed to register quotes_by_tier_total"),

            last_quoted_price: register_gauge!(
                "pricer_last_quoted_price",
                "Final nightly price of the most recent quote"
            )
            .expect("Failed to register last_quoted_price"),

            model_info: register_gauge_vec!(
                "pricer_model_info",
                "Information about the loaded model artifacts",
                &["role", "name", "backend", "checksum"]
            )
            .expect("Failed to register model_info"),

            inferences_total: register_int_gauge!(
                "pricer_inferences_total",
                "Dual model evaluations completed since startup"
            )
            .expect("Failed to register inferences_total"),

            slow_inferences_total: register_int_gauge!(
                "pricer_slow_inferences_total",
                "Dual model evaluations that exceeded the latency target"
            )
            .expect("Failed to register slow_inferences_total"),
        }
    }
}

/// Handle to the process-wide pricing metrics.
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct PricerMetrics {
    _private: (),
}

impl Default for PricerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PricerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PricerMetricsInner {
        GLOBAL_METRICS.get_or_init(PricerMetricsInner::new)
    }

    /// Record a successful quote
    pub fn record_quote(&self, result: &PredictionResult, duration_secs: f64) {
        let inner = self.inner();
        inner.quote_latency_seconds.observe(duration_secs);
        inner.quotes_total.inc();
        inner
            .quotes_by_tier_total
            .with_label_values(&[result.tier.label()])
            .inc();
        inner.last_quoted_price.set(result.blended.price);
    }

    /// Record a failed quote
    pub fn record_failure(&self, error: &PricingError) {
        self.inner()
            .quote_errors_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    /// Publish which artifact serves a role
    pub fn set_model_info(&self, role: &str, info: &ArtifactInfo) {
        self.inner()
            .model_info
            .with_label_values(&[role, &info.name, &info.backend, &info.checksum])
            .set(1.0);
    }

    /// Mirror the engine's inference counters
    pub fn record_inference_stats(&self, stats: &InferenceStats) {
        let inner = self.inner();
        inner.inferences_total.set(stats.total_inferences as i64);
        inner.slow_inferences_total.set(stats.slow_inferences as i64);
    }

    pub fn slow_inferences_total(&self) -> i64 {
        self.inner().slow_inferences_total.get()
    }

    pub fn quotes_total(&self) -> u64 {
        self.inner().quotes_total.get()
    }

    pub fn failures_total(&self, kind: &str) -> u64 {
        self.inner().quote_errors_total.with_label_values(&[kind]).get()
    }
}

/// Structured logger for pricing events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, market: &str) {
        info!(
            event = "pricer_started",
            instance = %self.instance,
            version = %version,
            market = %market,
            "Pricing service started"
        );
    }

    pub fn log_model_loaded(&self, role: &str, info: &ArtifactInfo) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            role = %role,
            model = %info.name,
            backend = %info.backend,
            path = %info.path,
            checksum = %info.checksum,
            size_bytes = info.size_bytes,
            feature_count = info.feature_count,
            "Model artifact loaded"
        );
    }

    pub fn log_model_load_failed(&self, error: &PricingError) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            error = %error,
            "Model artifact failed to load, refusing to serve"
        );
    }

    pub fn log_quote(&self, input: &RequestInput, result: &PredictionResult, elapsed_us: u64) {
        info!(
            event = "price_quoted",
            instance = %self.instance,
            accommodates = input.accommodates,
            bedrooms = input.bedrooms,
            neighborhood = ?input.neighborhood,
            room_type = ?input.room_type,
            month = input.month,
            is_weekend = input.is_weekend,
            primary = result.raw.primary,
            secondary = result.raw.secondary,
            multiplier = result.blended.multiplier,
            price = result.blended.price,
            tier = %result.tier,
            elapsed_us = elapsed_us,
            "Generated price quote"
        );
        if result.blended.price < 0.0 {
            warn!(
                event = "negative_price",
                instance = %self.instance,
                price = result.blended.price,
                "Quote produced a negative nightly price"
            );
        }
    }

    pub fn log_quote_failure(&self, error: &PricingError) {
        match error {
            PricingError::SchemaMismatch { .. } => {
                error!(
                    event = "quote_failed",
                    instance = %self.instance,
                    kind = error.kind(),
                    error = %error,
                    "Feature vector did not match model schema"
                );
            }
            _ => {
                warn!(
                    event = "quote_failed",
                    instance = %self.instance,
                    kind = error.kind(),
                    error = %error,
                    "Quote request failed"
                );
            }
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "pricer_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Pricing service shutting down"
        );
    }
}
