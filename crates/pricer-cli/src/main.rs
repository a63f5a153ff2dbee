//! Nightly Rate Pricer CLI
//!
//! A command-line tool for requesting quotes and inspecting a running
//! pricing server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{quote, status};

/// Nightly Rate Pricer CLI
#[derive(Parser)]
#[command(name = "pricer")]
#[command(author, version, about = "CLI for the Nightly Rate Pricer", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PRICER_API_URL env var)
    #[arg(long, env = "PRICER_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote a nightly rate for a listing
    Quote(quote::QuoteArgs),

    /// Show server health and readiness
    Health,

    /// Show the loaded model artifacts
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    let format = config.resolve_format(cli.format)?;
    let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url))?;

    match cli.command {
        Commands::Quote(args) => {
            quote::quote(
                &client,
                &args,
                config.default_neighborhood.as_deref(),
                format,
            )
            .await?;
        }
        Commands::Health => {
            status::show_health(&client, format).await?;
        }
        Commands::Models => {
            status::show_models(&client, format).await?;
        }
    }

    Ok(())
}
