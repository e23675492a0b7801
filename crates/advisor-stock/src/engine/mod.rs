//! Advisory pipeline
//!
//! Resolve the ticker, fetch prices, recommend. Every step is awaited in
//! sequence and the first failure ends the run.

pub mod advisor;
pub mod result;

pub use advisor::{Advisor, Progress};
pub use result::Analysis;
