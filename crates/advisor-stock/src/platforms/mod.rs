//! User-facing front ends for the advisor

pub mod console;
pub mod web;

pub use console::{ConsoleOptions, run_console};
pub use web::{AppState, router, serve};
