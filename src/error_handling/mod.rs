//! Error handling and lookup statistics.
//!
//! This module provides:
//! - Error type definitions for every component
//! - Categorization of transport errors into provider failures
//! - Lookup statistics tracking (provider failures, cache hits/misses)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use stats::LookupStats;
pub use types::{
    CacheError, ConfigError, DatabaseError, InitializationError, LoginError, ProviderError,
    ProviderFailure, RecorderError,
};
