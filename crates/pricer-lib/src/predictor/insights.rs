//! Human-readable reasons attached to a quote

use crate::models::{SeasonBucket, Tier};

/// Market named in seasonal reasons unless configured otherwise
pub const DEFAULT_MARKET_NAME: &str = "Santa Clara";

pub const WEEKEND_INSIGHT: &str = "Higher rates for weekend booking";
pub const LUXURY_INSIGHT: &str = "Luxury Class listing with premium positioning";

/// Builds the ordered insight list for a quote
#[derive(Debug, Clone)]
pub struct InsightGenerator {
    market_name: String,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MARKET_NAME)
    }
}

impl InsightGenerator {
    pub fn new(market_name: impl Into<String>) -> Self {
        Self {
            market_name: market_name.into(),
        }
    }

    pub fn market_name(&self) -> &str {
        &self.market_name
    }

    /// Seasonal reason, then weekend, then tier. Rules that did not fire add nothing.
    pub fn generate(&self, season: SeasonBucket, is_weekend: bool, tier: Tier) -> Vec<String> {
        let mut insights = Vec::with_capacity(3);

        match season {
            SeasonBucket::Peak => {
                insights.push(format!("Peak Season demand in {}", self.market_name))
            }
            SeasonBucket::Moderate => {
                insights.push(format!("Moderate Season demand in {}", self.market_name))
            }
            SeasonBucket::OffSeason => {}
        }
        if is_weekend {
            insights.push(WEEKEND_INSIGHT.to_string());
        }
        if tier == Tier::Luxury {
            insights.push(LUXURY_INSIGHT.to_string());
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_weekend_standard() {
        let insights = InsightGenerator::default().generate(SeasonBucket::Peak, true, Tier::Standard);
        assert_eq!(
            insights,
            vec![
                "Peak Season demand in Santa Clara".to_string(),
                "Higher rates for weekend booking".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_rules_in_order() {
        let insights = InsightGenerator::new("Palo Alto").generate(SeasonBucket::Moderate, true, Tier::Luxury);
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0], "Moderate Season demand in Palo Alto");
        assert_eq!(insights[1], WEEKEND_INSIGHT);
        assert_eq!(insights[2], LUXURY_INSIGHT);
    }

    #[test]
    fn test_off_season_weekday_economy_is_empty() {
        let insights = InsightGenerator::default().generate(SeasonBucket::OffSeason, false, Tier::Economy);
        assert!(insights.is_empty());
    }

    #[test]
    fn test_luxury_alone() {
        let insights = InsightGenerator::default().generate(SeasonBucket::OffSeason, false, Tier::Luxury);
        assert_eq!(insights, vec![LUXURY_INSIGHT.to_string()]);
    }
}
