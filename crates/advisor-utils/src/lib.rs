//! Shared utilities for the stock advisor
//!
//! Logging setup and secret resolution used by the library and binary crates.

pub mod logging;
pub mod secrets;

pub use logging::init_tracing;
pub use secrets::{SecretsError, SecretsStore, resolve_secret};
