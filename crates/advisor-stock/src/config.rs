//! Configuration for stock advisory operations

use crate::error::{Result, StockError};
use advisor_llm::providers::AnthropicConfig;
use advisor_utils::{SecretsStore, resolve_secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable / secret name holding the language-model API key
pub const API_KEY_NAME: &str = "ANTHROPIC_API_KEY";

/// Upper bound on provider attempts per fetch
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Default language model
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Configuration for stock advisory operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Language model used for ticker resolution and recommendations
    pub model: String,

    /// Token limit for the ticker-resolution call
    pub ticker_max_tokens: usize,

    /// Token limit for the recommendation call
    pub recommendation_max_tokens: usize,

    /// How long a provider response stays memoized
    pub cache_ttl: Duration,

    /// Total provider attempts when rate limited (first call included)
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    pub retry_backoff_base: Duration,

    /// Request timeout for outbound HTTP calls
    pub request_timeout: Duration,

    /// Override for the language-model API base URL
    pub api_base: Option<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ticker_max_tokens: 100,
            recommendation_max_tokens: 500,
            cache_ttl: Duration::from_secs(300), // 5 minutes
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            api_base: None,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigurationError(
                "model must not be empty".to_string(),
            ));
        }

        if self.max_retries == 0 || self.max_retries > MAX_ATTEMPTS_LIMIT {
            return Err(StockError::ConfigurationError(format!(
                "max_retries must be between 1 and {MAX_ATTEMPTS_LIMIT}"
            )));
        }

        if self.ticker_max_tokens == 0 || self.recommendation_max_tokens == 0 {
            return Err(StockError::ConfigurationError(
                "token limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the language-model API key: environment first, then secrets file
    ///
    /// A missing key is a fatal configuration error raised before any request.
    pub fn resolve_api_key(store: &SecretsStore) -> Result<String> {
        resolve_secret(API_KEY_NAME, store)?.ok_or_else(|| {
            StockError::ConfigurationError(format!(
                "{API_KEY_NAME} is not set; export it or add it to {}",
                store.path().display()
            ))
        })
    }

    /// Build the Anthropic client configuration for this config
    pub fn anthropic_config(&self, api_key: impl Into<String>) -> AnthropicConfig {
        let config = AnthropicConfig::new(api_key).with_timeout(self.request_timeout.as_secs());
        match &self.api_base {
            Some(base) => config.with_api_base(base.clone()),
            None => config,
        }
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    model: Option<String>,
    ticker_max_tokens: Option<usize>,
    recommendation_max_tokens: Option<usize>,
    cache_ttl: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    request_timeout: Option<Duration>,
    api_base: Option<String>,
}

impl StockConfigBuilder {
    /// Set the language model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the token limit for ticker resolution
    pub fn ticker_max_tokens(mut self, tokens: usize) -> Self {
        self.ticker_max_tokens = Some(tokens);
        self
    }

    /// Set the token limit for recommendations
    pub fn recommendation_max_tokens(mut self, tokens: usize) -> Self {
        self.recommendation_max_tokens = Some(tokens);
        self
    }

    /// Set the memoization lifespan
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Set total provider attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the language-model API base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Apply `ADVISOR_MODEL` and `ANTHROPIC_BASE_URL` when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(model) = env_value("ADVISOR_MODEL") {
            self.model = Some(model);
        }
        if let Some(base) = env_value("ANTHROPIC_BASE_URL") {
            self.api_base = Some(base);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            model: self.model.unwrap_or(defaults.model),
            ticker_max_tokens: self.ticker_max_tokens.unwrap_or(defaults.ticker_max_tokens),
            recommendation_max_tokens: self
                .recommendation_max_tokens
                .unwrap_or(defaults.recommendation_max_tokens),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            api_base: self.api_base.or(defaults.api_base),
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .model("claude-test")
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.model, "claude-test");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.recommendation_max_tokens, 500);
    }

    #[test]
    fn test_validation_rejects_zero_retries() {
        let result = StockConfig::builder().max_retries(0).build();
        assert!(matches!(result, Err(StockError::ConfigurationError(_))));
    }

    #[test]
    fn test_validation_rejects_blank_model() {
        let config = StockConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_attempts() {
        assert!(
            StockConfig::builder()
                .max_retries(MAX_ATTEMPTS_LIMIT)
                .build()
                .is_ok()
        );
        let result = StockConfig::builder().max_retries(64).build();
        assert!(matches!(result, Err(StockError::ConfigurationError(_))));
    }

    #[test]
    fn test_anthropic_config_uses_overrides() {
        let config = StockConfig::builder()
            .api_base("http://localhost:4010/v1")
            .build()
            .unwrap();
        let anthropic = config.anthropic_config("k");
        assert_eq!(anthropic.api_base, "http://localhost:4010/v1");
        assert_eq!(anthropic.timeout_secs, 30);
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        // Only meaningful when the developer has no key exported
        if std::env::var(API_KEY_NAME).is_ok() {
            return;
        }
        let store = SecretsStore::new("/nonexistent/advisor/.secrets");
        let result = StockConfig::resolve_api_key(&store);
        assert!(matches!(result, Err(StockError::ConfigurationError(_))));
    }
}
