//! Error types for stock advisory operations

use thiserror::Error;

/// Error-text fragments that identify provider throttling
const RATE_LIMIT_SIGNATURES: &[&str] = &["Too Many Requests", "Rate limited", "Rate limit"];

/// Stock advisory errors
#[derive(Debug, Error)]
pub enum StockError {
    /// No ticker could be determined from free text
    #[error("The company '{input}' does not appear to have a valid stock ticker symbol or it is not publicly traded")]
    ResolutionFailure {
        input: String,
    },

    /// Required price data missing after fallback
    #[error("Data not available for {ticker}: {reason}")]
    DataUnavailable {
        ticker: String,
        reason: String,
    },

    /// Transport or throttling failure from the market-data provider
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Report rendering failed
    #[error("Report rendering failed: {0}")]
    RenderFailure(String),

    /// Language-model call failed
    #[error("Language model error during {stage}: {source}")]
    Llm {
        stage: &'static str,
        #[source]
        source: advisor_llm::LLMError,
    },
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Whether the error text carries a provider rate-limit signature
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::ProviderError(message) => is_rate_limit_message(message),
            _ => false,
        }
    }

    /// Pipeline stage this error belongs to, for user-facing messages
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ResolutionFailure { .. } => "ticker resolution",
            Self::DataUnavailable { .. } | Self::ProviderError(_) => "market data",
            Self::ConfigurationError(_) => "configuration",
            Self::RenderFailure(_) => "report",
            Self::Llm { stage, .. } => *stage,
        }
    }
}

/// Wrap a language-model failure with the stage that made the call
pub fn llm_failure(stage: &'static str) -> impl Fn(advisor_llm::LLMError) -> StockError {
    move |source| StockError::Llm { stage, source }
}

/// Check an error text against the known rate-limit signatures
pub fn is_rate_limit_message(message: &str) -> bool {
    RATE_LIMIT_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature))
}

impl From<reqwest::Error> for StockError {
    fn from(err: reqwest::Error) -> Self {
        StockError::ProviderError(err.to_string())
    }
}

impl From<advisor_utils::SecretsError> for StockError {
    fn from(err: advisor_utils::SecretsError) -> Self {
        StockError::ConfigurationError(err.to_string())
    }
}
