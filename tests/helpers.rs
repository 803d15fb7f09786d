// Shared test helpers for database setup, provider mocks and resolver wiring.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use login_tracker::ip::{ManualClock, MemoryStore, Provider, TtlCache};
use login_tracker::{init_db_pool_with_path, run_migrations, IpResolver};

/// Cache key used by the resolver.
#[allow(dead_code)]
pub const CACHE_KEY: &str = "user_ip_data";

/// Creates a file-backed pool (WAL, busy timeout) with migrations applied.
#[allow(dead_code)]
pub async fn create_test_pool_with_path(db_path: &Path) -> Arc<SqlitePool> {
    let pool = init_db_pool_with_path(db_path)
        .await
        .expect("Failed to create test database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Fixed starting instant for manual clocks.
#[allow(dead_code)]
pub fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

/// Body served by the detailed provider mock.
#[allow(dead_code)]
pub fn detailed_body() -> Value {
    json!({
        "ip": "8.8.8.8",
        "city": "Mountain View",
        "region": "California",
        "country_name": "United States",
        "country_code": "US",
        "timezone": "America/Los_Angeles",
        "org": "Google LLC",
        "latitude": 37.4056,
        "longitude": -122.0775
    })
}

/// HTTP client with a short timeout for mock providers.
#[allow(dead_code)]
pub fn test_client(timeout: Duration) -> Arc<reqwest::Client> {
    Arc::new(
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build test client"),
    )
}

/// Resolver over an in-memory cache driven by `clock`.
#[allow(dead_code)]
pub fn test_resolver(
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    detailed_url: String,
    fallback_urls: &[String],
) -> IpResolver {
    let cache = TtlCache::new(store, clock, CACHE_KEY, Duration::from_secs(24 * 60 * 60));
    IpResolver::new(
        test_client(Duration::from_secs(2)),
        cache,
        Provider::detailed(detailed_url),
        fallback_urls.iter().map(Provider::ip_only).collect(),
    )
}
