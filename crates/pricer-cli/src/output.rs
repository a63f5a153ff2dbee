//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any response as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Prices arrive pre-formatted with two decimals
pub fn format_price(price: &str) -> String {
    format!("${}", price)
}

/// Format seconds of uptime as `1d 2h 3m`
pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Shorten a hex checksum for tables
pub fn short_checksum(checksum: &str) -> String {
    checksum.chars().take(12).collect()
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color a market tier label
pub fn color_tier(tier: &str) -> String {
    if tier.starts_with("Luxury") {
        tier.magenta().bold().to_string()
    } else if tier.starts_with("Standard") {
        tier.cyan().to_string()
    } else {
        tier.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.00Ki");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00Mi");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3_700), "1h 1m");
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
        assert_eq!(format_uptime(-5), "0s");
    }

    #[test]
    fn test_short_checksum() {
        assert_eq!(short_checksum("0123456789abcdef0123"), "0123456789ab");
        assert_eq!(short_checksum("abc"), "abc");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("434.00"), "$434.00");
    }
}
