//! Stock advisory pipeline
//!
//! Turns a ticker or company name into a BUY/HOLD/SELL recommendation:
//!
//! - Ticker resolution: symbols pass through, company names go to the
//!   language model (`TickerResolver`)
//! - Market data: live price and analyst mean target from Yahoo Finance,
//!   memoized for five minutes and retried with backoff on rate limits
//!   (`MarketDataFetcher`)
//! - Recommendation: model-backed or a fixed threshold rule
//!   (`RecommendationStrategy`)
//! - Presentation: console text, an HTML dashboard and an optional PDF report
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_stock::{Advisor, StockConfig, api::YahooFinanceClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::default();
//!     let provider = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
//!
//!     // Rule-based, no API key needed
//!     let advisor = Advisor::demo(provider, &config);
//!     let analysis = advisor.analyze("NVDA").await?;
//!     println!("{}", analysis.recommendation);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod platforms;
pub mod prompts;
pub mod recommendation;
pub mod report;
pub mod retry;
pub mod ticker;

// Re-export main types for convenience
pub use config::StockConfig;
pub use engine::{Advisor, Analysis, Progress};
pub use error::{Result, StockError};
pub use fetcher::{MarketDataFetcher, PriceSnapshot};
pub use recommendation::{
    DeterministicStrategy, ModelBackedStrategy, Recommendation, RecommendationStrategy, Verdict,
};
pub use ticker::{Ticker, TickerQuery, TickerResolver};

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fakes for unit tests

    use crate::api::{MarketDataProvider, Quote, TickerInfo};
    use crate::engine::Analysis;
    use crate::error::{Result, StockError};
    use crate::fetcher::PriceSnapshot;
    use crate::recommendation::{DeterministicStrategy, Recommendation};
    use crate::ticker::Ticker;
    use advisor_llm::{CompletionRequest, CompletionResponse, LanguageModelClient, TokenUsage};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    mockall::mock! {
        pub Llm {}

        #[async_trait]
        impl LanguageModelClient for Llm {
            async fn complete(&self, request: CompletionRequest) -> advisor_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    /// A model reply with fixed token usage
    pub fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            usage: TokenUsage {
                input_tokens: 20,
                output_tokens: 3,
            },
        }
    }

    pub fn info(current: Option<f64>, target: Option<f64>) -> TickerInfo {
        TickerInfo {
            current_price: current,
            target_mean_price: target,
            ..Default::default()
        }
    }

    /// Provider returning a fixed info mapping, optionally failing first
    pub struct ScriptedProvider {
        info: TickerInfo,
        history: Vec<Quote>,
        failures: Mutex<VecDeque<StockError>>,
        info_calls: AtomicU32,
    }

    impl ScriptedProvider {
        pub fn new(info: TickerInfo) -> Self {
            Self {
                info,
                history: Vec::new(),
                failures: Mutex::new(VecDeque::new()),
                info_calls: AtomicU32::new(0),
            }
        }

        pub fn with_closes(mut self, closes: &[f64]) -> Self {
            self.history = closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Quote {
                    symbol: "TEST".to_string(),
                    timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1_000,
                    adjclose: close,
                })
                .collect();
            self
        }

        /// Errors returned, in order, by the first `ticker_info` calls
        pub fn failing_first(self, errors: Vec<StockError>) -> Self {
            *self.failures.lock().unwrap() = errors.into();
            self
        }

        pub fn info_calls(&self) -> u32 {
            self.info_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for ScriptedProvider {
        async fn ticker_info(&self, _ticker: &Ticker) -> Result<TickerInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().unwrap().pop_front() {
                Some(err) => Err(err),
                None => Ok(self.info.clone()),
            }
        }

        async fn daily_history(&self, _ticker: &Ticker) -> Result<Vec<Quote>> {
            Ok(self.history.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// A finished rule-based analysis
    pub fn analysis(symbol: &str, current: f64, target: f64) -> Analysis {
        let ticker = Ticker::parse(symbol).unwrap();
        let (verdict, rationale) = DeterministicStrategy::evaluate(&ticker, current, target);
        Analysis {
            query: symbol.to_string(),
            ticker: ticker.clone(),
            snapshot: PriceSnapshot {
                ticker: ticker.clone(),
                current_price: Some(current),
                target_price: Some(target),
                error: None,
            },
            info: TickerInfo {
                current_price: Some(current),
                target_mean_price: Some(target),
                long_name: Some(format!("{symbol} Inc.")),
                ..Default::default()
            },
            recommendation: Recommendation::new(ticker, verdict, rationale),
            usage: None,
        }
    }
}
