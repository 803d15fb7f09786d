//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_CACHE_DIR, DEFAULT_HISTORY_LIMIT, DEFAULT_USER_AGENT, DETAILED_PROVIDER_URL,
    FALLBACK_PROVIDER_URLS, IP_CACHE_TTL, PROVIDER_TIMEOUT_SECS,
};
use crate::error_handling::ConfigError;
use crate::history::Role;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// What to do when the login history cannot be persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RecordFailurePolicy {
    /// Fail the login attempt
    #[default]
    Reject,
    /// Complete the login and log a warning
    Warn,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use login_tracker::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("lms.db"),
///     timeout_seconds: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Directory holding the cached IP bundle
    pub cache_dir: PathBuf,

    /// How long a cached IP bundle stays valid
    pub cache_ttl: Duration,

    /// Per-request provider timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Detailed geolocation provider
    pub detailed_provider: String,

    /// IP-only providers, in priority order
    pub fallback_providers: Vec<String>,

    /// Behavior when the login history write fails
    pub on_record_failure: RecordFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_ttl: IP_CACHE_TTL,
            timeout_seconds: PROVIDER_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            detailed_provider: DETAILED_PROVIDER_URL.to_string(),
            fallback_providers: FALLBACK_PROVIDER_URLS
                .iter()
                .map(|u| u.to_string())
                .collect(),
            on_record_failure: RecordFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Checks that every provider endpoint is an absolute http(s) URL and
    /// that the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        std::iter::once(&self.detailed_provider)
            .chain(self.fallback_providers.iter())
            .try_for_each(|endpoint| validate_endpoint(endpoint))
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidProviderUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidProviderUrl {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "login_tracker",
    version,
    about = "Captures login IP/geolocation metadata and keeps per-user login history"
)]
pub struct Opt {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    /// SQLite database path
    #[arg(long, env = "LOGIN_TRACKER_DB_PATH", default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Directory for the cached IP bundle
    #[arg(long, env = "LOGIN_TRACKER_CACHE_DIR", default_value = DEFAULT_CACHE_DIR, global = true)]
    pub cache_dir: PathBuf,

    /// Per-request provider timeout in seconds
    #[arg(long, default_value_t = PROVIDER_TIMEOUT_SECS, global = true)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Detailed geolocation provider URL
    #[arg(long, default_value = DETAILED_PROVIDER_URL, global = true)]
    pub detailed_provider: String,

    /// IP-only fallback provider URL (repeatable, tried in order)
    #[arg(long = "fallback-provider", global = true)]
    pub fallback_providers: Vec<String>,

    /// Behavior when the login history cannot be written
    #[arg(long, value_enum, default_value = "reject", global = true)]
    pub on_record_failure: RecordFailurePolicy,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the public IP and location and print them as JSON
    Resolve,
    /// Register a user
    AddUser {
        /// Display name
        #[arg(long)]
        name: String,
        /// Unique email address
        #[arg(long)]
        email: String,
        /// Role
        #[arg(long, value_enum, default_value = "student")]
        role: Role,
    },
    /// Resolve the IP bundle and record a login for the user
    Login {
        /// Email of the user logging in
        #[arg(long)]
        email: String,
    },
    /// Print a user's login history
    History {
        /// Email of the user
        #[arg(long)]
        email: String,
        /// Maximum number of entries (most recent first)
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        let fallback_providers = if opt.fallback_providers.is_empty() {
            Config::default().fallback_providers
        } else {
            opt.fallback_providers.clone()
        };
        Config {
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
            db_path: opt.db_path.clone(),
            cache_dir: opt.cache_dir.clone(),
            cache_ttl: IP_CACHE_TTL,
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent.clone(),
            detailed_provider: opt.detailed_provider.clone(),
            fallback_providers,
            on_record_failure: opt.on_record_failure,
        }
    }
}
