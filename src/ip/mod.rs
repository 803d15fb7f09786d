//! Client IP address and geolocation detection.
//!
//! This module resolves the caller's public IP and coarse location from
//! third-party lookup providers, caches the result locally for a day, and
//! never fails: when every provider is unreachable the result degrades to
//! the `"IP Detection Failed"` sentinel with `"Unknown"` location fields.

mod cache;
mod provider;
mod resolver;
mod types;
mod validate;

// Re-export public API
pub use cache::{Clock, FileStore, KeyValueStore, ManualClock, MemoryStore, SystemClock, TtlCache};
pub use provider::{Provider, ProviderKind};
pub use resolver::IpResolver;
pub use types::IpLookupResult;
pub use validate::is_valid_ip;
