//! API client for communicating with the pricing server

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// API client for the pricing server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid API URL")?;
        // relative joins replace the last path segment unless it ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Request a quote for one listing
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse> {
        self.post("predict", request).await
    }

    /// Fetch the health report. A 503 still carries a report worth showing.
    pub async fn health(&self) -> Result<HealthReport> {
        let url = self.base_url.join("healthz").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }
        Self::parse(response).await
    }

    pub async fn readiness(&self) -> Result<ReadinessReport> {
        let url = self.base_url.join("readyz").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        // readyz answers 503 with a body explaining why
        response.json().await.context("Failed to parse response")
    }

    pub async fn models(&self) -> Result<ModelsReport> {
        self.get("api/v1/models").await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => anyhow::bail!("API error ({}): {}", status, err.error),
                Err(_) => anyhow::bail!("API error ({}): {}", status, body),
            }
        }

        response.json().await.context("Failed to parse response")
    }
}

// API request and response types

/// Body of `POST /predict`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bath: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    pub month: u32,
    pub is_weekend: u8,
    pub available: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub success: bool,
    pub price: String,
    pub range_low: String,
    pub range_high: String,
    pub rf: String,
    #[serde(default)]
    pub xgb: Option<String>,
    #[serde(default)]
    pub multiplier: Option<String>,
    pub tier: String,
    pub impact: Impact,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impact {
    #[serde(rename = "Size")]
    pub size: f64,
    #[serde(rename = "Beds")]
    pub beds: f64,
    #[serde(rename = "Baths")]
    pub baths: f64,
    #[serde(rename = "Amenities")]
    pub amenities: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: i64,
    pub components: BTreeMap<String, ComponentReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReport {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub path: String,
    pub backend: String,
    pub checksum: String,
    pub size_bytes: u64,
    pub feature_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsReport {
    pub primary: ModelInfo,
    pub secondary: ModelInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    pub error: String,
}
