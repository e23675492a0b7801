//! Market-data provider seam and the records it returns

use crate::error::Result;
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key-value information the provider exposes for a ticker
///
/// Field names serialize with the provider's camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerInfo {
    /// Live quote
    pub current_price: Option<f64>,
    /// Mean analyst target price
    pub target_mean_price: Option<f64>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Fraction, e.g. 0.0052 for 0.52%
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub volume: Option<u64>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub long_business_summary: Option<String>,
}

/// Stock quote data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// One memoizable provider response: info plus one day of history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub info: TickerInfo,
    pub history: Vec<Quote>,
}

impl MarketData {
    /// Closing price of the most recent history row
    pub fn last_close(&self) -> Option<f64> {
        self.history.last().map(|quote| quote.close)
    }
}

/// A source of market data
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the info mapping for a ticker
    async fn ticker_info(&self, ticker: &Ticker) -> Result<TickerInfo>;

    /// Fetch one day of price history
    async fn daily_history(&self, ticker: &Ticker) -> Result<Vec<Quote>>;

    /// Provider name, for logs
    fn name(&self) -> &str;
}
