//! Error type definitions.
//!
//! This module defines all error types used throughout the application, plus
//! the `ProviderFailure` categories tracked by `LookupStats`.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A provider endpoint is not an absolute http(s) URL.
    #[error("Invalid provider URL '{url}': {reason}")]
    InvalidProviderUrl { url: String, reason: String },

    /// Provider timeout must be at least one second.
    #[error("Provider timeout must be greater than zero")]
    InvalidTimeout,
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Failure of a single lookup provider.
///
/// Provider failures never reach the caller of `IpResolver::resolve`; they
/// are logged, counted, and the next provider is tried.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: ReqwestError,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("response from {url} carries no IP address")]
    MissingIp { url: String },

    #[error("{url} returned an invalid IP address '{value}'")]
    InvalidIp { url: String, value: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ReqwestError,
    },
}

impl ProviderError {
    /// Category used for statistics.
    pub fn failure(&self) -> ProviderFailure {
        match self {
            ProviderError::Timeout { .. } => ProviderFailure::Timeout,
            ProviderError::Connect { .. } => ProviderFailure::Connect,
            ProviderError::Status { .. } => ProviderFailure::HttpStatus,
            ProviderError::Malformed { .. } => ProviderFailure::MalformedBody,
            ProviderError::MissingIp { .. } => ProviderFailure::MissingIp,
            ProviderError::InvalidIp { .. } => ProviderFailure::InvalidIp,
            ProviderError::Request { .. } => ProviderFailure::Request,
        }
    }
}

/// Errors from the local key-value cache backend.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while persisting login history.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The user record does not exist.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// The history append or projection update failed; nothing was written.
    #[error("failed to persist login history: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Errors returned by the login flow.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("no user registered with email '{0}'")]
    UnknownUser(String),

    #[error("user lookup failed: {0}")]
    Lookup(#[from] sqlx::Error),

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

/// Categories of provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ProviderFailure {
    Timeout,
    Connect,
    HttpStatus,
    MalformedBody,
    MissingIp,
    InvalidIp,
    Request,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProviderFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFailure::Timeout => "Provider timeout",
            ProviderFailure::Connect => "Provider connect error",
            ProviderFailure::HttpStatus => "Provider HTTP error status",
            ProviderFailure::MalformedBody => "Malformed provider response",
            ProviderFailure::MissingIp => "Provider response without IP",
            ProviderFailure::InvalidIp => "Provider returned invalid IP",
            ProviderFailure::Request => "Provider request error",
        }
    }
}
