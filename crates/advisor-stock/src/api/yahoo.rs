//! Yahoo Finance client
//!
//! History comes from the `yahoo_finance_api` chart endpoint. The info
//! mapping (live price, analyst target, profile, valuation) comes from the
//! `quoteSummary` endpoint, which needs a session cookie and crumb.

use crate::api::provider::{MarketDataProvider, Quote, TickerInfo};
use crate::error::{Result, StockError};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str =
    "financialData,price,summaryProfile,summaryDetail,defaultKeyStatistics";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    http: Client,
    connector: yahoo::YahooConnector,
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        let connector = yahoo::YahooConnector::new()
            .map_err(|e| StockError::ProviderError(e.to_string()))?;

        Ok(Self {
            http,
            connector,
            crumb: Mutex::new(None),
        })
    }

    /// Fetch (once per session) the crumb that authorizes quoteSummary calls
    async fn crumb(&self) -> Result<String> {
        let mut crumb = self.crumb.lock().await;
        if let Some(value) = crumb.as_ref() {
            return Ok(value.clone());
        }

        // Sets the session cookie; the status of this call is irrelevant
        let _ = self.http.get(COOKIE_URL).send().await?;

        let response = self.http.get(CRUMB_URL).send().await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body, "crumb")?;

        let value = body.trim().to_string();
        if value.is_empty() {
            return Err(StockError::ProviderError(
                "Yahoo Finance returned an empty crumb".to_string(),
            ));
        }

        debug!("Obtained Yahoo Finance crumb");
        *crumb = Some(value.clone());
        Ok(value)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn ticker_info(&self, ticker: &Ticker) -> Result<TickerInfo> {
        let crumb = self.crumb().await?;

        let response = self
            .http
            .get(format!("{QUOTE_SUMMARY_URL}/{ticker}"))
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Stale session; next call starts a fresh one
            *self.crumb.lock().await = None;
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StockError::ProviderError(format!(
                "Invalid ticker symbol: {ticker}"
            )));
        }

        let body = response.text().await?;
        check_status(status, &body, "quoteSummary")?;

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            StockError::ProviderError(format!("Malformed quoteSummary response: {e}"))
        })?;
        parse_quote_summary(ticker, &json)
    }

    #[instrument(skip(self))]
    async fn daily_history(&self, ticker: &Ticker) -> Result<Vec<Quote>> {
        let response = self
            .connector
            .get_latest_quotes(ticker.as_str(), "1d")
            .await
            .map_err(|e| StockError::ProviderError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::ProviderError(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| Quote {
                symbol: ticker.to_string(),
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Map a non-success status to a provider error; 429 keeps its reason phrase
fn check_status(status: StatusCode, body: &str, call: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(StockError::ProviderError(format!(
            "Too Many Requests ({call})"
        )));
    }
    Err(StockError::ProviderError(format!(
        "Yahoo Finance {call} failed with HTTP {status}: {}",
        body.chars().take(200).collect::<String>()
    )))
}

/// Numeric field that Yahoo wraps as `{"raw": .., "fmt": ..}` or sends bare
fn number(module: &Value, field: &str) -> Option<f64> {
    let value = module.get(field)?;
    value
        .get("raw")
        .and_then(Value::as_f64)
        .or_else(|| value.as_f64())
}

fn text(module: &Value, field: &str) -> Option<String> {
    module
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Build a [`TickerInfo`] from a quoteSummary document
pub fn parse_quote_summary(ticker: &Ticker, json: &Value) -> Result<TickerInfo> {
    let summary = &json["quoteSummary"];
    let Some(result) = summary["result"].get(0) else {
        let description = summary["error"]["description"]
            .as_str()
            .unwrap_or("no quote summary returned");
        return Err(StockError::ProviderError(format!(
            "Invalid ticker symbol: {ticker} ({description})"
        )));
    };

    let financial = &result["financialData"];
    let price = &result["price"];
    let profile = &result["summaryProfile"];
    let detail = &result["summaryDetail"];
    let stats = &result["defaultKeyStatistics"];

    Ok(TickerInfo {
        current_price: number(financial, "currentPrice"),
        target_mean_price: number(financial, "targetMeanPrice"),
        long_name: text(price, "longName"),
        sector: text(profile, "sector"),
        industry: text(profile, "industry"),
        market_cap: number(price, "marketCap").or_else(|| number(detail, "marketCap")),
        trailing_pe: number(detail, "trailingPE"),
        price_to_book: number(stats, "priceToBook"),
        dividend_yield: number(detail, "dividendYield"),
        beta: number(detail, "beta"),
        volume: number(detail, "volume").map(|v| v as u64),
        country: text(profile, "country"),
        website: text(profile, "website"),
        long_business_summary: text(profile, "longBusinessSummary"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nvda() -> Ticker {
        Ticker::parse("NVDA").unwrap()
    }

    #[test]
    fn test_parse_quote_summary() {
        let doc = json!({
            "quoteSummary": {
                "result": [{
                    "financialData": {
                        "currentPrice": {"raw": 100.0, "fmt": "100.00"},
                        "targetMeanPrice": {"raw": 130.0, "fmt": "130.00"}
                    },
                    "price": {
                        "longName": "NVIDIA Corporation",
                        "marketCap": {"raw": 3.2e12, "fmt": "3.2T"}
                    },
                    "summaryProfile": {
                        "sector": "Technology",
                        "industry": "Semiconductors",
                        "country": "United States",
                        "website": "https://www.nvidia.com",
                        "longBusinessSummary": "Designs GPUs."
                    },
                    "summaryDetail": {
                        "trailingPE": {"raw": 55.1},
                        "dividendYield": {"raw": 0.0003},
                        "beta": {"raw": 1.7},
                        "volume": {"raw": 250000000.0}
                    },
                    "defaultKeyStatistics": {
                        "priceToBook": {"raw": 50.2}
                    }
                }],
                "error": null
            }
        });

        let info = parse_quote_summary(&nvda(), &doc).unwrap();
        assert_eq!(info.current_price, Some(100.0));
        assert_eq!(info.target_mean_price, Some(130.0));
        assert_eq!(info.long_name.as_deref(), Some("NVIDIA Corporation"));
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.market_cap, Some(3.2e12));
        assert_eq!(info.trailing_pe, Some(55.1));
        assert_eq!(info.price_to_book, Some(50.2));
        assert_eq!(info.volume, Some(250_000_000));
    }

    #[test]
    fn test_parse_missing_modules_leaves_fields_empty() {
        let doc = json!({
            "quoteSummary": {
                "result": [{"financialData": {"currentPrice": {"raw": 12.5}}}],
                "error": null
            }
        });

        let info = parse_quote_summary(&nvda(), &doc).unwrap();
        assert_eq!(info.current_price, Some(12.5));
        assert_eq!(info.target_mean_price, None);
        assert_eq!(info.sector, None);
        assert_eq!(info.market_cap, None);
    }

    #[test]
    fn test_parse_empty_result_is_provider_error() {
        let doc = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZZ"}
            }
        });

        let err = parse_quote_summary(&nvda(), &doc).unwrap_err();
        assert!(err.to_string().contains("Invalid ticker symbol"));
        assert!(err.to_string().contains("Quote not found"));
    }

    #[test]
    fn test_too_many_requests_is_rate_limited() {
        let err = check_status(StatusCode::TOO_MANY_REQUESTS, "", "quoteSummary").unwrap_err();
        assert!(err.is_rate_limited());

        let err = check_status(StatusCode::BAD_GATEWAY, "oops", "quoteSummary").unwrap_err();
        assert!(!err.is_rate_limited());
        assert!(check_status(StatusCode::OK, "", "crumb").is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_info_and_history() {
        let client = YahooFinanceClient::new(Duration::from_secs(30)).unwrap();
        let ticker = Ticker::parse("AAPL").unwrap();

        let info = client.ticker_info(&ticker).await.unwrap();
        assert!(info.long_name.is_some());

        let history = client.daily_history(&ticker).await.unwrap();
        assert!(!history.is_empty());
    }
}
