//! Market-data providers

pub mod provider;
pub mod yahoo;

pub use provider::{MarketData, MarketDataProvider, Quote, TickerInfo};
pub use yahoo::YahooFinanceClient;
