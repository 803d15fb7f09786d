//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including provider endpoints, cache lifetimes, timeouts and sentinel values.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./login_tracker.db";

/// Default directory for the client-side IP cache
pub const DEFAULT_CACHE_DIR: &str = ".ip_cache";

/// Storage key under which the resolved IP bundle is cached
pub const IP_CACHE_KEY: &str = "user_ip_data";

/// Lifetime of a cached IP bundle (24 hours)
///
/// An entry is expired once `now - cachedAt` strictly exceeds this value.
pub const IP_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-request timeout for provider lookups in seconds
pub const PROVIDER_TIMEOUT_SECS: u64 = 5;

/// SQLite busy timeout in seconds
///
/// Concurrent recorders for the same user wait on the write lock instead of
/// failing immediately with `SQLITE_BUSY`.
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;

/// Detailed geolocation provider (IP, city, region, country, ISP and coordinates in one call)
pub const DETAILED_PROVIDER_URL: &str = "https://ipapi.co/json/";

/// IP-only lookup services, tried in order when the detailed provider fails
pub const FALLBACK_PROVIDER_URLS: &[&str] = &[
    "https://api.ipify.org?format=json",
    "https://api.ip.sb/jsonip",
    "https://ipapi.co/json/",
    "https://api.myip.com",
];

/// Placeholder IP returned when every provider failed
pub const IP_DETECTION_FAILED: &str = "IP Detection Failed";

/// Placeholder for location fields a provider did not report
pub const UNKNOWN: &str = "Unknown";

/// Placeholder country code used by the IP-only fallback path
pub const UNKNOWN_COUNTRY_CODE: &str = "XX";

/// Default number of history entries printed by `history`
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Capacity of the notification bus channel
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// User-Agent sent to lookup providers
pub const DEFAULT_USER_AGENT: &str = concat!("login_tracker/", env!("CARGO_PKG_VERSION"));

/// Maximum stored length (in characters) of client-supplied location fields
pub const MAX_LOCATION_FIELD_LENGTH: usize = 128;
