//! Language-model client trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for language-model clients
///
/// The advisor only ever issues single-turn requests (a system prompt plus
/// one user message) and reads back the first text block and token usage.
/// Clients are constructed once by the caller and passed around explicitly.
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    /// Generate a completion from the model
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with system prompt and messages
    ///
    /// # Returns
    ///
    /// The reply text and token usage
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the client name (e.g., "anthropic")
    fn name(&self) -> &str;
}
