//! Investment insights derived from the price gap and company profile

use crate::api::TickerInfo;
use serde::Serialize;

/// Sectors counted as a positive factor
const STRONG_SECTORS: &[&str] = &["Technology", "Healthcare", "Financial Services"];

/// Market cap above which a company counts as large
const LARGE_CAP: f64 = 100e9;

/// Upside bucket for the percentage gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialTier {
    High,
    Medium,
    Low,
    AboveTarget,
}

impl PotentialTier {
    pub fn from_pct(pct: f64) -> Self {
        if pct > 20.0 {
            Self::High
        } else if pct > 10.0 {
            Self::Medium
        } else if pct > 0.0 {
            Self::Low
        } else {
            Self::AboveTarget
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High upside potential (20%+)",
            Self::Medium => "Medium upside potential (10-20%)",
            Self::Low => "Low upside potential (0-10%)",
            Self::AboveTarget => "Trading above the analyst target",
        }
    }
}

/// Factors shown next to a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub tier: PotentialTier,
    pub positive_factors: Vec<String>,
    pub considerations: Vec<String>,
}

impl Insights {
    pub fn derive(pct: f64, info: &TickerInfo) -> Self {
        let mut positive_factors = Vec::new();
        if pct > 15.0 {
            positive_factors.push("Well below the analyst target price".to_string());
        }
        if let Some(sector) = info
            .sector
            .as_deref()
            .filter(|s| STRONG_SECTORS.contains(s))
        {
            positive_factors.push(format!("Strong sector ({sector})"));
        }
        if info.market_cap.is_some_and(|cap| cap > LARGE_CAP) {
            positive_factors.push("Large market capitalization (stability)".to_string());
        }

        let mut considerations = Vec::new();
        if pct < 5.0 {
            considerations.push("Limited room for growth".to_string());
        }
        if pct < 0.0 {
            considerations.push("Possibly overbought".to_string());
        }
        considerations.push("Market conditions change".to_string());

        Self {
            tier: PotentialTier::from_pct(pct),
            positive_factors,
            considerations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(PotentialTier::from_pct(30.0), PotentialTier::High);
        assert_eq!(PotentialTier::from_pct(20.0), PotentialTier::Medium);
        assert_eq!(PotentialTier::from_pct(10.5), PotentialTier::Medium);
        assert_eq!(PotentialTier::from_pct(10.0), PotentialTier::Low);
        assert_eq!(PotentialTier::from_pct(0.1), PotentialTier::Low);
        assert_eq!(PotentialTier::from_pct(0.0), PotentialTier::AboveTarget);
        assert_eq!(PotentialTier::from_pct(-8.0), PotentialTier::AboveTarget);
    }

    #[test]
    fn test_large_tech_well_below_target() {
        let info = TickerInfo {
            sector: Some("Technology".to_string()),
            market_cap: Some(3.2e12),
            ..Default::default()
        };
        let insights = Insights::derive(30.0, &info);

        assert_eq!(insights.positive_factors.len(), 3);
        assert!(insights.positive_factors[1].contains("Technology"));
        assert_eq!(insights.considerations, vec!["Market conditions change"]);
    }

    #[test]
    fn test_above_target_considerations() {
        let info = TickerInfo {
            sector: Some("Energy".to_string()),
            market_cap: Some(5e9),
            ..Default::default()
        };
        let insights = Insights::derive(-10.0, &info);

        assert!(insights.positive_factors.is_empty());
        assert_eq!(insights.considerations.len(), 3);
        assert_eq!(insights.tier, PotentialTier::AboveTarget);
    }
}
