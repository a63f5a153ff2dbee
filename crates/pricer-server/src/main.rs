//! Pricing server - nightly rate quotes over HTTP
//!
//! Loads the two trained models once at startup and serves `/predict`
//! alongside health, readiness and metrics endpoints.

use anyhow::{Context, Result};
use pricer_lib::{
    health::{components, HealthRegistry},
    observability::{PricerMetrics, StructuredLogger},
    PricingEngine,
};
use pricer_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PRICER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        primary = %config.primary_model_path.display(),
        secondary = %config.secondary_model_path.display(),
        "Pricer configured"
    );

    let logger = StructuredLogger::new(&config.instance_name);
    let metrics = PricerMetrics::new();

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODELS).await;
    health_registry.register(components::PRICING_ENGINE).await;

    // Both artifacts must load before the server accepts traffic
    let engine = match PricingEngine::load(
        &config.primary_model_path,
        &config.secondary_model_path,
        &config.market_name,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            logger.log_model_load_failed(&e);
            return Err(e).context("Failed to load model artifacts");
        }
    };

    let [primary, secondary] = engine.model_infos();
    for (role, info) in [("primary", primary), ("secondary", secondary)] {
        metrics.set_model_info(role, info);
        logger.log_model_loaded(role, info);
    }
    health_registry.set_models_loaded(true).await;

    logger.log_startup(PRICER_VERSION, &config.market_name);

    let state = Arc::new(api::AppState::new(
        Arc::new(engine),
        health_registry,
        metrics,
        logger.clone(),
    ));

    api::serve(config.listen_port, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    Ok(())
}
