//! Threshold rule on the percentage gap between current and target price

use super::{Recommendation, RecommendationStrategy, Verdict};
use crate::error::Result;
use crate::fetcher::potential_pct;
use crate::ticker::Ticker;
use advisor_llm::TokenUsage;
use async_trait::async_trait;

/// Above this gap (exclusive) the verdict is BUY
const BUY_ABOVE: f64 = 15.0;
/// Above this gap (exclusive) the stock is "slightly below target"
const SLIGHTLY_BELOW_ABOVE: f64 = 5.0;
/// At or above this gap the verdict is HOLD; below it SELL
const SELL_BELOW: f64 = -5.0;

/// Rule-based strategy; needs no model and no API key
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicStrategy;

impl DeterministicStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Verdict and rationale for a price pair
    pub fn evaluate(ticker: &Ticker, current: f64, target: f64) -> (Verdict, String) {
        let pct = potential_pct(current, target);

        if pct > BUY_ABOVE {
            (
                Verdict::Buy,
                format!(
                    "{ticker} trades well below the analyst target. The current price is ${current:.2} \
                     while analysts expect ${target:.2} (potential upside {pct:.1}%). \
                     This points to a significant appreciation opportunity."
                ),
            )
        } else if pct > SLIGHTLY_BELOW_ABOVE {
            (
                Verdict::Hold,
                format!(
                    "{ticker} trades slightly below the analyst target. The current price ${current:.2} \
                     could rise to ${target:.2} (about {pct:.1}%), a moderate opportunity. \
                     Hold and monitor."
                ),
            )
        } else if pct >= SELL_BELOW {
            (
                Verdict::Hold,
                format!(
                    "{ticker} trades close to the analyst target. The current price ${current:.2} \
                     is in balance with the target ${target:.2} ({pct:+.1}%). \
                     Hold the position and watch for changes."
                ),
            )
        } else {
            (
                Verdict::Sell,
                format!(
                    "{ticker} trades above the analyst target. The current price ${current:.2} \
                     exceeds the target ${target:.2} by {:.1}%, which may indicate it is overbought. \
                     Consider taking profits.",
                    pct.abs()
                ),
            )
        }
    }
}

#[async_trait]
impl RecommendationStrategy for DeterministicStrategy {
    async fn recommend(
        &self,
        ticker: &Ticker,
        current_price: f64,
        target_price: f64,
    ) -> Result<(Recommendation, Option<TokenUsage>)> {
        let (verdict, rationale) = Self::evaluate(ticker, current_price, target_price);
        Ok((Recommendation::new(ticker.clone(), verdict, rationale), None))
    }

    fn name(&self) -> &str {
        "deterministic"
    }
}
