//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, provider endpoints, cache lifetime)
//! - CLI option types and parsing
//! - The library-level `Config` struct

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Command, Config, LogFormat, LogLevel, Opt, RecordFailurePolicy};
