//! Quote command

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, QuoteRequest, QuoteResponse};
use crate::output::{color_tier, format_price, print_info, print_json, print_table, OutputFormat};

/// Listing attributes for a quote
#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// Number of guests the listing accommodates (server default 0)
    #[arg(long)]
    pub acc: Option<u32>,

    /// Number of bedrooms (server default 0)
    #[arg(long)]
    pub bed: Option<u32>,

    /// Number of bathrooms, half baths allowed (server default 1)
    #[arg(long)]
    pub bath: Option<f64>,

    /// Number of listed amenities (server default 15)
    #[arg(long)]
    pub amenities: Option<u32>,

    /// Neighborhood name as used in the training data
    #[arg(long, short)]
    pub neighborhood: Option<String>,

    /// Room type (e.g. "Entire home/apt", "Private room")
    #[arg(long, short)]
    pub room_type: Option<String>,

    /// Stay month (1-12); defaults to the current month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Stay date (YYYY-MM-DD); sets month and weekend together
    #[arg(long, conflicts_with_all = ["month", "weekend"])]
    pub date: Option<String>,

    /// Price a weekend night
    #[arg(long)]
    pub weekend: bool,

    /// Listing is currently not bookable
    #[arg(long)]
    pub unavailable: bool,
}

/// Row for the quote summary table
#[derive(Tabled)]
struct QuoteRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Row for the impact table
#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Factor")]
    factor: &'static str,
    #[tabled(rename = "Impact")]
    score: String,
}

/// Month and weekend flag for a stay date
pub fn month_and_weekend(date: &str) -> Result<(u32, bool)> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
    Ok((date.month(), date.weekday().num_days_from_monday() >= 5))
}

/// Turn command line arguments into a request body
pub fn build_request(args: &QuoteArgs, default_neighborhood: Option<&str>) -> Result<QuoteRequest> {
    let (month, is_weekend) = match &args.date {
        Some(date) => month_and_weekend(date)?,
        None => (
            args.month.unwrap_or_else(|| Local::now().month()),
            args.weekend,
        ),
    };

    Ok(QuoteRequest {
        acc: args.acc,
        bed: args.bed,
        bath: args.bath,
        amenities: args.amenities,
        neighborhood: args
            .neighborhood
            .clone()
            .or_else(|| default_neighborhood.map(str::to_string)),
        room_type: args.room_type.clone(),
        month,
        is_weekend: u8::from(is_weekend),
        available: u8::from(!args.unavailable),
    })
}

/// Request and print a quote
pub async fn quote(
    client: &ApiClient,
    args: &QuoteArgs,
    default_neighborhood: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let request = build_request(args, default_neighborhood)?;
    let response = client.quote(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => render(&request, &response),
    }

    Ok(())
}

fn render(request: &QuoteRequest, response: &QuoteResponse) {
    println!(
        "{} {}",
        "Nightly rate:".bold(),
        format_price(&response.price).green().bold()
    );
    println!();

    let mut rows = vec![
        QuoteRow {
            field: "Range".to_string(),
            value: format!(
                "{} - {}",
                format_price(&response.range_low),
                format_price(&response.range_high)
            ),
        },
        QuoteRow {
            field: "Tier".to_string(),
            value: color_tier(&response.tier),
        },
        QuoteRow {
            field: "Month".to_string(),
            value: request.month.to_string(),
        },
        QuoteRow {
            field: "Weekend".to_string(),
            value: if request.is_weekend == 1 { "yes" } else { "no" }.to_string(),
        },
        QuoteRow {
            field: "Random forest".to_string(),
            value: format_price(&response.rf),
        },
    ];
    if let Some(xgb) = &response.xgb {
        rows.push(QuoteRow {
            field: "Gradient boosting".to_string(),
            value: format_price(xgb),
        });
    }
    if let Some(multiplier) = &response.multiplier {
        rows.push(QuoteRow {
            field: "Multiplier".to_string(),
            value: format!("x{}", multiplier),
        });
    }
    print_table(&rows);

    println!("\n{}", "Feature impact".bold());
    let impact = &response.impact;
    print_table(&[
        ImpactRow {
            factor: "Size",
            score: format!("{:.2}", impact.size),
        },
        ImpactRow {
            factor: "Beds",
            score: format!("{:.2}", impact.beds),
        },
        ImpactRow {
            factor: "Baths",
            score: format!("{:.2}", impact.baths),
        },
        ImpactRow {
            factor: "Amenities",
            score: format!("{:.2}", impact.amenities),
        },
    ]);

    if !response.insights.is_empty() {
        println!();
        for insight in &response.insights {
            print_info(insight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> QuoteArgs {
        QuoteArgs {
            acc: Some(4),
            bed: Some(2),
            bath: Some(2.0),
            amenities: Some(20),
            neighborhood: None,
            room_type: Some("Entire home/apt".to_string()),
            month: Some(7),
            date: None,
            weekend: true,
            unavailable: false,
        }
    }

    #[test]
    fn test_date_derives_month_and_weekend() {
        // 2024-07-13 was a Saturday
        assert_eq!(month_and_weekend("2024-07-13").unwrap(), (7, true));
        // 2024-12-02 was a Monday
        assert_eq!(month_and_weekend("2024-12-02").unwrap(), (12, false));
        // Friday is not a weekend night
        assert_eq!(month_and_weekend("2024-03-15").unwrap(), (3, false));
    }

    #[test]
    fn test_invalid_date() {
        let err = month_and_weekend("13/07/2024").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_build_request_from_flags() {
        let request = build_request(&args(), None).unwrap();
        assert_eq!(request.acc, Some(4));
        assert_eq!(request.month, 7);
        assert_eq!(request.is_weekend, 1);
        assert_eq!(request.available, 1);
        assert!(request.neighborhood.is_none());
    }

    #[test]
    fn test_build_request_with_date() {
        let mut args = args();
        args.month = None;
        args.weekend = false;
        args.date = Some("2024-02-18".to_string());
        args.unavailable = true;

        let request = build_request(&args, Some("San Jose")).unwrap();
        assert_eq!(request.month, 2);
        assert_eq!(request.is_weekend, 1);
        assert_eq!(request.available, 0);
        assert_eq!(request.neighborhood.as_deref(), Some("San Jose"));
    }

    #[test]
    fn test_omitted_attributes_are_left_to_the_server() {
        let args = QuoteArgs {
            acc: None,
            bed: None,
            bath: None,
            amenities: None,
            neighborhood: None,
            room_type: None,
            month: Some(3),
            date: None,
            weekend: false,
            unavailable: false,
        };
        let request = build_request(&args, None).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        let body = body.as_object().unwrap();

        for field in ["acc", "bed", "bath", "amenities", "neighborhood", "room_type"] {
            assert!(!body.contains_key(field), "{} should be omitted", field);
        }
        assert_eq!(body["month"], 3);
        assert_eq!(body["is_weekend"], 0);
        assert_eq!(body["available"], 1);
    }

    #[test]
    fn test_explicit_neighborhood_beats_config() {
        let mut args = args();
        args.neighborhood = Some("Palo Alto".to_string());
        let request = build_request(&args, Some("San Jose")).unwrap();
        assert_eq!(request.neighborhood.as_deref(), Some("Palo Alto"));
    }
}
