//! Language-model client layer for the stock advisor
//!
//! This crate provides a small, provider-agnostic surface for the one
//! wire-level contract the advisor has with a language model:
//!
//! - Message types for a single-turn request
//! - Completion request/response records
//! - The [`LanguageModelClient`] trait
//! - The Anthropic Messages client (behind the `anthropic` feature)

pub mod client;
pub mod completion;
pub mod error;
pub mod messages;

// Re-export main types
pub use client::LanguageModelClient;
pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};

// Client implementations (feature-gated)
#[cfg(feature = "anthropic")]
pub mod providers;
