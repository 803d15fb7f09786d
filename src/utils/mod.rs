//! Utility functions.
//!
//! This module provides:
//! - The ordered `first_success` fallback combinator
//! - Sanitization of client-supplied strings

mod fallback;
pub mod sanitize;

pub use fallback::first_success;
