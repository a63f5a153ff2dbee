//! Health tracking for the pricing service
//!
//! Backs the `/healthz` and `/readyz` endpoints. The service is ready only
//! after both model artifacts are loaded and no component is unhealthy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is still serving but something looks wrong
    Degraded,
    /// Component cannot serve
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub uptime_seconds: i64,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across all components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .max_by_key(|s| match s {
                ComponentStatus::Healthy => 0,
                ComponentStatus::Degraded => 1,
                ComponentStatus::Unhealthy => 2,
            })
            .unwrap_or(ComponentStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    /// Both model artifacts
    pub const MODELS: &str = "models";
    /// Request-time pricing pipeline
    pub const PRICING_ENGINE: &str = "pricing_engine";
}

/// Shared registry of component health
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    models_loaded: Arc<RwLock<bool>>,
    started_at: i64,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            models_loaded: Arc::new(RwLock::new(false)),
            started_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    /// Record that both artifacts are in memory
    pub async fn set_models_loaded(&self, loaded: bool) {
        *self.models_loaded.write().await = loaded;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse {
            status,
            uptime_seconds: (chrono::Utc::now().timestamp() - self.started_at).max(0),
            components,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let loaded = *self.models_loaded.read().await;
        let health = self.health().await;

        let reason = if !loaded {
            Some("Model artifacts not loaded".to_string())
        } else if !health.status.is_operational() {
            let failing: Vec<_> = health
                .components
                .iter()
                .filter(|(_, c)| !c.status.is_operational())
                .map(|(name, _)| name.as_str())
                .collect();
            Some(format!("Unhealthy components: {}", failing.join(", ")))
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_registry_is_healthy() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
        assert!(health.uptime_seconds >= 0);
    }

    #[tokio::test]
    async fn test_worst_component_wins() {
        let registry = HealthRegistry::new();
        registry.register(components::MODELS).await;
        registry.register(components::PRICING_ENGINE).await;

        registry
            .set_degraded(components::PRICING_ENGINE, "schema mismatch seen")
            .await;
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);

        registry.set_unhealthy(components::MODELS, "artifact missing").await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);

        registry.set_healthy(components::MODELS).await;
        registry.set_healthy(components::PRICING_ENGINE).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_not_ready_until_models_loaded() {
        let registry = HealthRegistry::new();
        registry.register(components::MODELS).await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Model artifacts not loaded"));

        registry.set_models_loaded(true).await;
        let readiness = registry.readiness().await;
        assert!(readiness.ready);
        assert!(readiness.reason.is_none());
    }

    #[tokio::test]
    async fn test_degraded_is_still_ready() {
        let registry = HealthRegistry::new();
        registry.register(components::PRICING_ENGINE).await;
        registry.set_models_loaded(true).await;
        registry.set_degraded(components::PRICING_ENGINE, "slow").await;
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_unhealthy_component_blocks_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::MODELS).await;
        registry.set_models_loaded(true).await;
        registry.set_unhealthy(components::MODELS, "gone").await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.unwrap().contains("models"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ComponentStatus::Degraded).unwrap(),
            "\"degraded\""
        );
    }
}
