//! Health and model inspection commands

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::client::{ApiClient, HealthReport, ModelInfo, ReadinessReport};
use crate::output::{
    color_status, format_bytes, format_uptime, print_error, print_json, print_success,
    print_table, short_checksum, OutputFormat,
};

/// Row for the components table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Row for the models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Role")]
    role: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Features")]
    features: usize,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Checksum")]
    checksum: String,
}

impl ModelRow {
    fn new(role: &'static str, info: &ModelInfo) -> Self {
        Self {
            role,
            name: info.name.clone(),
            backend: info.backend.clone(),
            features: info.feature_count,
            size: format_bytes(info.size_bytes),
            checksum: short_checksum(&info.checksum),
        }
    }
}

#[derive(Serialize)]
struct StatusReport {
    health: HealthReport,
    readiness: ReadinessReport,
}

/// Show server health and readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let readiness = client.readiness().await?;

    match format {
        OutputFormat::Json => print_json(&StatusReport { health, readiness })?,
        OutputFormat::Table => {
            println!("{}", "Pricer Status".bold());
            println!("{}", "=".repeat(50));
            println!("Status:   {}", color_status(&health.status));
            println!("Uptime:   {}", format_uptime(health.uptime_seconds));
            println!();

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&component.status),
                    message: component.message.clone().unwrap_or_default(),
                })
                .collect();
            print_table(&rows);
            println!();

            if readiness.ready {
                print_success("Ready to serve quotes");
            } else {
                print_error(&format!(
                    "Not ready: {}",
                    readiness.reason.as_deref().unwrap_or("unknown reason")
                ));
            }
        }
    }

    Ok(())
}

/// Show the loaded model artifacts
pub async fn show_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let models = client.models().await?;

    match format {
        OutputFormat::Json => print_json(&models)?,
        OutputFormat::Table => {
            print_table(&[
                ModelRow::new("primary", &models.primary),
                ModelRow::new("secondary", &models.secondary),
            ]);
        }
    }

    Ok(())
}
