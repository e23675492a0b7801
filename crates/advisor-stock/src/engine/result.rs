//! Analysis result handed to the presentation layer

use crate::api::TickerInfo;
use crate::fetcher::{PriceSnapshot, potential_pct};
use crate::recommendation::Recommendation;
use crate::report::Insights;
use crate::ticker::Ticker;
use advisor_llm::TokenUsage;
use serde::{Deserialize, Serialize};

/// Everything one run of the pipeline produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// What the user typed
    pub query: String,
    pub ticker: Ticker,
    pub snapshot: PriceSnapshot,
    pub info: TickerInfo,
    pub recommendation: Recommendation,
    /// Summed over every model call of the run
    pub usage: Option<TokenUsage>,
}

impl Analysis {
    /// Current price; always present on a finished analysis
    pub fn current_price(&self) -> f64 {
        self.snapshot.current_price.unwrap_or_default()
    }

    /// Analyst mean target price
    pub fn target_price(&self) -> f64 {
        self.snapshot.target_price.unwrap_or_default()
    }

    /// Percentage gap from current to target price
    pub fn potential_pct(&self) -> f64 {
        potential_pct(self.current_price(), self.target_price())
    }

    /// Company name, falling back to the ticker
    pub fn company_name(&self) -> &str {
        self.info
            .long_name
            .as_deref()
            .unwrap_or(self.ticker.as_str())
    }

    pub fn insights(&self) -> Insights {
        Insights::derive(self.potential_pct(), &self.info)
    }
}
