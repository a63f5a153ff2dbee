//! HTTP API for quotes, health checks and Prometheus metrics

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pricer_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::{PricerMetrics, StructuredLogger},
    predictor::ArtifactInfo,
    ImpactBreakdown, PredictionResult, PricingEngine, PricingError, Tier,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
    pub health_registry: HealthRegistry,
    pub metrics: PricerMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        engine: Arc<PricingEngine>,
        health_registry: HealthRegistry,
        metrics: PricerMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            engine,
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Successful quote body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub success: bool,
    pub price: String,
    pub range_low: String,
    pub range_high: String,
    pub rf: String,
    pub xgb: String,
    pub multiplier: String,
    pub tier: Tier,
    pub impact: ImpactBreakdown,
    pub insights: Vec<String>,
}

impl From<&PredictionResult> for QuoteResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            success: true,
            price: format!("{:.2}", result.blended.price),
            range_low: format!("{:.2}", result.blended.low),
            range_high: format!("{:.2}", result.blended.high),
            rf: format!("{:.2}", result.raw.primary),
            xgb: format!("{:.2}", result.raw.secondary),
            multiplier: format!("{:.2}", result.blended.multiplier),
            tier: result.tier,
            impact: result.impact,
            insights: result.insights.clone(),
        }
    }
}

/// Uniform failure body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

impl FailureResponse {
    fn from_error(err: &PricingError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
        }
    }
}

/// Loaded artifacts as reported by `/api/v1/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub primary: ArtifactInfo,
    pub secondary: ArtifactInfo,
}

/// Price a listing. Any request-scoped error becomes a 400 with the failure body.
async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let started = Instant::now();

    let outcome = pricer_lib::parse_request_body(&body)
        .and_then(|input| state.engine.quote(&input).map(|result| (input, result)));
    state.metrics.record_inference_stats(&state.engine.stats());

    match outcome {
        Ok((input, result)) => {
            let elapsed = started.elapsed();
            state.metrics.record_quote(&result, elapsed.as_secs_f64());
            state
                .logger
                .log_quote(&input, &result, elapsed.as_micros() as u64);
            (StatusCode::OK, Json(QuoteResponse::from(&result))).into_response()
        }
        Err(err) => quote_failure(&state, &err).await,
    }
}

/// Map a request-scoped error to the uniform 400 body. A schema mismatch means
/// an artifact disagrees with the encoder, so the engine is marked degraded.
async fn quote_failure(state: &AppState, err: &PricingError) -> Response {
    state.metrics.record_failure(err);
    state.logger.log_quote_failure(err);
    if matches!(err, PricingError::SchemaMismatch { .. }) {
        state
            .health_registry
            .set_degraded(components::PRICING_ENGINE, err.to_string())
            .await;
    }
    (StatusCode::BAD_REQUEST, Json(FailureResponse::from_error(err))).into_response()
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once both models are loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let [primary, secondary] = state.engine.model_infos();
    Json(ModelsResponse {
        primary: primary.clone(),
        secondary: secondary.clone(),
    })
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/api/v1/models", get(models))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_lib::predictor::{FeatureSchema, InsightGenerator, ModelArtifact, TreeEnsemble};
    use std::collections::HashMap;

    fn constant_artifact(name: &str, value: f64) -> Arc<ModelArtifact> {
        let schema = FeatureSchema::new(["accommodates", "bedrooms"]).unwrap();
        let regressor = TreeEnsemble::constant(value, schema.len()).unwrap();
        Arc::new(ModelArtifact::new(name, schema, HashMap::new(), Box::new(regressor)).unwrap())
    }

    async fn state() -> AppState {
        let health_registry = HealthRegistry::new();
        health_registry.register(components::MODELS).await;
        health_registry.register(components::PRICING_ENGINE).await;
        health_registry.set_models_loaded(true).await;
        AppState::new(
            Arc::new(PricingEngine::new(
                constant_artifact("rf", 300.0),
                constant_artifact("xgb", 320.0),
                InsightGenerator::default(),
            )),
            health_registry,
            PricerMetrics::new(),
            StructuredLogger::new("test"),
        )
    }

    #[tokio::test]
    async fn test_schema_mismatch_degrades_engine() {
        let state = state().await;
        let before = state.metrics.failures_total("schema_mismatch");
        let err = PricingError::SchemaMismatch {
            model: "xgb".to_string(),
            reason: "expected 2 columns, got 3".to_string(),
        };

        let response = quote_failure(&state, &err).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.metrics.failures_total("schema_mismatch"), before + 1);
        let health = state.health_registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[components::PRICING_ENGINE].status,
            ComponentStatus::Degraded
        );
        // degraded still serves
        assert!(state.health_registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_evaluation_failure_leaves_health_alone() {
        let state = state().await;
        let err = PricingError::ModelEvaluation {
            model: "xgb".to_string(),
            reason: "non-finite prediction NaN".to_string(),
        };

        let response = quote_failure(&state, &err).await;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let failure: FailureResponse = serde_json::from_slice(&body).unwrap();

        assert!(!failure.success);
        assert!(failure.error.contains("xgb"));
        assert_eq!(
            state.health_registry.health().await.status,
            ComponentStatus::Healthy
        );
    }
}
