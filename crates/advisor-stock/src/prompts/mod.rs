//! Prompt texts sent to the language model
//!
//! - `system`: fixed system instructions per call site
//! - `user`: user message builders

mod system;
mod user;

pub use system::*;
pub use user::*;
