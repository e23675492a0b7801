//! Ticker classification and resolution

use crate::config::StockConfig;
use crate::error::{Result, StockError, llm_failure};
use crate::prompts;
use advisor_llm::{CompletionRequest, LanguageModelClient, Message, TokenUsage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{info, instrument};

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,5}$").expect("ticker pattern is valid"));

/// A validated ticker symbol: 1-5 uppercase ASCII letters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Validate a symbol exactly as given (no case folding)
    pub fn parse(symbol: &str) -> Option<Self> {
        TICKER_PATTERN
            .is_match(symbol)
            .then(|| Self(symbol.to_string()))
    }

    /// The symbol text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid ticker symbol: {value}"))
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Raw user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerQuery {
    /// Input already is a ticker
    Ticker(Ticker),
    /// Anything else; needs resolution
    CompanyName(String),
}

impl TickerQuery {
    /// Classify user text; surrounding whitespace is ignored
    pub fn classify(raw: &str) -> Self {
        let text = raw.trim();
        match Ticker::parse(text) {
            Some(ticker) => Self::Ticker(ticker),
            None => Self::CompanyName(text.to_string()),
        }
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved ticker
    pub ticker: Ticker,
    /// Token usage when a model call was needed
    pub usage: Option<TokenUsage>,
}

/// Resolves user input to a ticker, asking the model for company names
pub struct TickerResolver {
    llm: Option<Arc<dyn LanguageModelClient>>,
    model: String,
    max_tokens: usize,
}

impl TickerResolver {
    /// Create a resolver that asks the language model for company names
    pub fn new(llm: Arc<dyn LanguageModelClient>, config: &StockConfig) -> Self {
        Self {
            llm: Some(llm),
            model: config.model.clone(),
            max_tokens: config.ticker_max_tokens,
        }
    }

    /// Create a resolver without a model: input is upper-cased and validated
    pub fn offline() -> Self {
        Self {
            llm: None,
            model: String::new(),
            max_tokens: 0,
        }
    }

    /// Resolve raw input to a ticker
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw: &str) -> Result<Resolution> {
        let name = match TickerQuery::classify(raw) {
            TickerQuery::Ticker(ticker) => {
                info!(%ticker, "input is a ticker");
                return Ok(Resolution { ticker, usage: None });
            }
            TickerQuery::CompanyName(name) => name,
        };

        if name.is_empty() {
            return Err(StockError::ResolutionFailure { input: name });
        }

        let Some(llm) = &self.llm else {
            return Ticker::parse(&name.to_uppercase())
                .map(|ticker| Resolution { ticker, usage: None })
                .ok_or(StockError::ResolutionFailure { input: name });
        };

        let request = CompletionRequest::builder(&self.model)
            .system(prompts::TICKER_RESOLVER)
            .add_message(Message::user(prompts::ticker_question(&name)))
            .max_tokens(self.max_tokens)
            .build();

        let response = llm
            .complete(request)
            .await
            .map_err(llm_failure("ticker resolution"))?;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "token usage for ticker resolution"
        );

        let candidate = response.text.trim().to_uppercase();
        match Ticker::parse(&candidate) {
            Some(ticker) => {
                info!(%ticker, company = %name, "ticker identified");
                Ok(Resolution {
                    ticker,
                    usage: Some(response.usage),
                })
            }
            None => Err(StockError::ResolutionFailure { input: name }),
        }
    }
}
