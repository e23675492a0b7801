//! Recommendation engine
//!
//! A [`RecommendationStrategy`] turns `(ticker, current, target)` into a
//! [`Recommendation`]. Two strategies exist:
//!
//! - [`ModelBackedStrategy`]: asks the language model
//! - [`DeterministicStrategy`]: fixed thresholds on the percentage gap
//!
//! Verdicts are never cached.

mod model;
mod rule;

pub use model::ModelBackedStrategy;
pub use rule::DeterministicStrategy;

use crate::error::Result;
use crate::ticker::Ticker;
use advisor_llm::TokenUsage;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attached to every recommendation
pub const DISCLAIMER: &str = "Disclaimer: This recommendation is for informational purposes only and does not constitute financial advice. Please consult a qualified financial advisor before making investment decisions.";

/// How many leading characters of a model reply are searched for a verdict
const VERDICT_WINDOW: usize = 50;

/// Recommendation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Sell,
}

impl Verdict {
    /// Upper-case label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        }
    }

    /// Classify a free-text model reply
    ///
    /// The first 50 characters of the trimmed, upper-cased reply are searched
    /// for "BUY", then "SELL"; anything else is HOLD.
    pub fn from_reply(reply: &str) -> Self {
        let window: String = reply
            .trim()
            .to_uppercase()
            .chars()
            .take(VERDICT_WINDOW)
            .collect();

        if window.contains("BUY") {
            Self::Buy
        } else if window.contains("SELL") {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verdict with its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: Ticker,
    pub verdict: Verdict,
    pub rationale: String,
    pub disclaimer: String,
    pub generated_at: DateTime<Local>,
}

impl Recommendation {
    /// Build a recommendation stamped now, with the standard disclaimer
    pub fn new(ticker: Ticker, verdict: Verdict, rationale: impl Into<String>) -> Self {
        Self {
            ticker,
            verdict,
            rationale: rationale.into(),
            disclaimer: DISCLAIMER.to_string(),
            generated_at: Local::now(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.rationale, self.disclaimer)
    }
}

/// Produces a verdict for a ticker from its current and target price
#[async_trait]
pub trait RecommendationStrategy: Send + Sync {
    /// Recommend; the usage is `Some` when a model call was made
    async fn recommend(
        &self,
        ticker: &Ticker,
        current_price: f64,
        target_price: f64,
    ) -> Result<(Recommendation, Option<TokenUsage>)>;

    /// Strategy name, for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_reply() {
        assert_eq!(Verdict::from_reply("BUY. The stock trades well below target."), Verdict::Buy);
        assert_eq!(Verdict::from_reply("  Recommendation: sell"), Verdict::Sell);
        assert_eq!(Verdict::from_reply("I'd hold for now."), Verdict::Hold);
        // BUY wins when both appear in the window
        assert_eq!(Verdict::from_reply("Not a SELL, rather a BUY"), Verdict::Buy);
    }

    #[test]
    fn test_verdict_window_is_fifty_chars() {
        let late = format!("{}BUY", "x".repeat(50));
        assert_eq!(Verdict::from_reply(&late), Verdict::Hold);

        let edge = format!("{}BUY", "x".repeat(47));
        assert_eq!(Verdict::from_reply(&edge), Verdict::Buy);
    }

    #[test]
    fn test_verdict_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Verdict::Sell).unwrap(), "\"SELL\"");
        assert_eq!(Verdict::Hold.to_string(), "HOLD");
    }

    #[test]
    fn test_display_appends_disclaimer() {
        let rec = Recommendation::new(Ticker::parse("NVDA").unwrap(), Verdict::Buy, "Cheap.");
        let text = rec.to_string();
        assert!(text.starts_with("Cheap."));
        assert!(text.ends_with(DISCLAIMER));
    }
}
