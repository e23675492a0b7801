//! Market data fetching: memoized, rate-limit aware price lookup

use crate::api::{MarketData, MarketDataProvider, TickerInfo};
use crate::cache::StockCache;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::retry::RetryPolicy;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Prices for one ticker at one point in time
///
/// When `error` is set both prices are unusable, whatever their raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub ticker: Ticker,
    pub current_price: Option<f64>,
    pub target_price: Option<f64>,
    pub error: Option<String>,
}

impl PriceSnapshot {
    /// Derive a snapshot from a provider response
    ///
    /// The current price falls back to the last historical close; the target
    /// price has no fallback.
    pub fn from_market_data(ticker: Ticker, data: &MarketData) -> Self {
        let current_price = data.info.current_price.or_else(|| data.last_close());
        let target_price = data.info.target_mean_price;

        let error = match (current_price, target_price) {
            (None, _) => Some("no current price or recent close".to_string()),
            (_, None) => Some("no analyst target price".to_string()),
            (Some(current), _) if !(current.is_finite() && current > 0.0) => {
                Some(format!("current price {current} is not a positive number"))
            }
            (_, Some(target)) if !target.is_finite() => {
                Some(format!("target price {target} is not a number"))
            }
            _ => None,
        };

        Self {
            ticker,
            current_price,
            target_price,
            error,
        }
    }

    /// `(current, target)` when both are present and no error is recorded
    pub fn usable_prices(&self) -> Option<(f64, f64)> {
        if self.error.is_some() {
            return None;
        }
        Some((self.current_price?, self.target_price?))
    }

    /// Like [`usable_prices`](Self::usable_prices), but a failure is `DataUnavailable`
    pub fn require_prices(&self) -> Result<(f64, f64)> {
        self.usable_prices()
            .ok_or_else(|| StockError::DataUnavailable {
                ticker: self.ticker.to_string(),
                reason: self
                    .error
                    .clone()
                    .unwrap_or_else(|| "price data incomplete".to_string()),
            })
    }

    /// Percentage gap from current to target price
    pub fn potential_pct(&self) -> Option<f64> {
        self.usable_prices()
            .map(|(current, target)| potential_pct(current, target))
    }
}

/// `(target - current) * 100 / current`
pub fn potential_pct(current: f64, target: f64) -> f64 {
    (target - current) * 100.0 / current
}

/// Prices plus the info mapping they came from
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub snapshot: PriceSnapshot,
    pub info: TickerInfo,
}

/// Fetches market data through a provider, with memoization and retries
pub struct MarketDataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: StockCache<Ticker, MarketData>,
    retry: RetryPolicy,
}

impl MarketDataFetcher {
    /// Create a fetcher using the configured cache lifespan and retry policy
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &StockConfig) -> Self {
        Self {
            provider,
            cache: StockCache::new(config.cache_ttl),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Raw provider response for a ticker
    ///
    /// The cache sits inside the retry loop: a hit never waits.
    pub async fn market_data(&self, ticker: &Ticker) -> Result<MarketData> {
        self.retry
            .execute("market data", move || {
                self.cache
                    .get_or_fetch(ticker.clone(), move || self.load(ticker))
            })
            .await
    }

    /// Fetch prices for a ticker
    ///
    /// Missing prices are `DataUnavailable` and are not retried.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch(&self, ticker: &Ticker) -> Result<Fetched> {
        let data = self.market_data(ticker).await?;
        let snapshot = PriceSnapshot::from_market_data(ticker.clone(), &data);
        snapshot.require_prices()?;

        info!(
            %ticker,
            current = snapshot.current_price,
            target = snapshot.target_price,
            "price data retrieved"
        );

        Ok(Fetched {
            snapshot,
            info: data.info,
        })
    }

    /// History is only requested when the info mapping lacks a live price
    async fn load(&self, ticker: &Ticker) -> Result<MarketData> {
        let info = self.provider.ticker_info(ticker).await?;
        let history = match info.current_price {
            Some(_) => Vec::new(),
            None => self.provider.daily_history(ticker).await?,
        };
        Ok(MarketData { info, history })
    }
}
