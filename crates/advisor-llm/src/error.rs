//! Error types for language-model operations

use thiserror::Error;

/// Result type for language-model operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while talking to a language model
#[derive(Error, Debug)]
pub enum LLMError {
    /// The API answered with a non-success status
    #[error("API Error {status}: {body}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// HTTP transport error
    #[cfg(feature = "anthropic")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Success response did not have the expected shape
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = LLMError::RequestFailed {
            status: 529,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API Error 529: overloaded");
    }

    #[test]
    fn test_unexpected_response_display() {
        let err = LLMError::UnexpectedResponse("missing content[0].text".to_string());
        assert_eq!(
            err.to_string(),
            "Unexpected response format: missing content[0].text"
        );
    }
}
