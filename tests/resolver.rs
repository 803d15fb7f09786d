//! Integration tests for IP resolution against mocked providers.
//!
//! These tests verify:
//! - Field mapping from the detailed provider and write-through caching
//! - Fallback ordering when providers fail or return invalid addresses
//! - The 24-hour cache window
//! - Degradation to the sentinel when every provider fails

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{detailed_body, start_time, test_client, test_resolver, CACHE_KEY};
use login_tracker::error_handling::ProviderFailure;
use login_tracker::ip::{KeyValueStore, ManualClock, MemoryStore, Provider, TtlCache};
use login_tracker::{IpResolver, NoticeLevel, NotificationBus};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_detailed_provider_result_is_mapped_and_cached() {
    let server = MockServer::start().await;
    mount_json(&server, "/json/", detailed_body(), 1).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(
        store.clone(),
        clock,
        format!("{}/json/", server.uri()),
        &[],
    );

    let result = resolver.resolve().await;
    assert_eq!(result.ip, "8.8.8.8");
    assert_eq!(result.city, "Mountain View");
    assert_eq!(result.region, "California");
    assert_eq!(result.country, "United States");
    assert_eq!(result.country_code, "US");
    assert_eq!(result.timezone, "America/Los_Angeles");
    assert_eq!(result.isp, "Google LLC");

    let raw = store.get(CACHE_KEY).unwrap().expect("result should be cached");
    let cached: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached["ip"], "8.8.8.8");
    assert_eq!(cached["countryCode"], "US");
    assert_eq!(cached["cachedAt"], "2025-09-01T08:00:00Z");
}

#[tokio::test]
async fn test_fresh_cache_skips_network() {
    let server = MockServer::start().await;
    // Only the first resolve may reach the provider
    mount_json(&server, "/json/", detailed_body(), 1).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(store, clock.clone(), format!("{}/json/", server.uri()), &[]);

    let first = resolver.resolve().await;
    clock.advance(chrono::Duration::hours(23) + chrono::Duration::minutes(59));
    let second = resolver.resolve().await;

    assert_eq!(first, second);
    assert_eq!(resolver.stats().cache_hits(), 1);
    assert_eq!(resolver.stats().cache_misses(), 1);
}

#[tokio::test]
async fn test_fresh_cache_entry_with_invalid_ip_is_refetched() {
    let server = MockServer::start().await;
    mount_json(&server, "/json/", detailed_body(), 1).await;

    let store = Arc::new(MemoryStore::new());
    store
        .set(
            CACHE_KEY,
            &json!({
                "ip": "<html>not an ip</html>",
                "city": "Nowhere",
                "region": "Unknown",
                "country": "Unknown",
                "countryCode": "XX",
                "timezone": "Unknown",
                "isp": "Unknown",
                "latitude": null,
                "longitude": null,
                "cachedAt": "2025-09-01T07:00:00Z"
            })
            .to_string(),
        )
        .unwrap();
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(
        store.clone(),
        clock,
        format!("{}/json/", server.uri()),
        &[],
    );

    let result = resolver.resolve().await;
    assert_eq!(result.ip, "8.8.8.8");
    assert_eq!(result.city, "Mountain View");
    assert_eq!(resolver.stats().cache_hits(), 0);
    assert_eq!(resolver.stats().cache_misses(), 1);

    // The bad entry is replaced by the fresh lookup
    let raw = store.get(CACHE_KEY).unwrap().unwrap();
    let cached: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached["ip"], "8.8.8.8");
}

#[tokio::test]
async fn test_stale_cache_triggers_new_lookup() {
    let server = MockServer::start().await;
    mount_json(&server, "/json/", detailed_body(), 2).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(store, clock.clone(), format!("{}/json/", server.uri()), &[]);

    resolver.resolve().await;
    clock.advance(chrono::Duration::hours(24) + chrono::Duration::minutes(1));
    let result = resolver.resolve().await;

    assert_eq!(result.ip, "8.8.8.8");
    assert_eq!(resolver.stats().cache_hits(), 0);
    assert_eq!(resolver.stats().cache_misses(), 2);
}

#[tokio::test]
async fn test_invalid_ip_falls_through_to_ip_only_provider() {
    let server = MockServer::start().await;
    mount_json(&server, "/json/", json!({"ip": "999.1.1.1", "city": "Nowhere"}), 1).await;
    mount_json(&server, "/ipify", json!({"ip": "203.0.113.9"}), 1).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(
        store,
        clock,
        format!("{}/json/", server.uri()),
        &[format!("{}/ipify", server.uri())],
    );

    let result = resolver.resolve().await;
    assert_eq!(result.ip, "203.0.113.9");
    assert_eq!(result.city, "Unknown");
    assert_eq!(result.country, "Unknown");
    assert_eq!(result.country_code, "XX");
    assert_eq!(result.isp, "Unknown");
    assert_eq!(
        resolver.stats().get_failure_count(ProviderFailure::InvalidIp),
        1
    );
}

#[tokio::test]
async fn test_fallbacks_tried_in_order_with_alternate_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(&server, "/first", json!({"message": "no ip here"}), 1).await;
    mount_json(&server, "/second", json!({"query": "198.51.100.23"}), 1).await;
    mount_json(&server, "/third", json!({"IPv4": "192.0.2.1"}), 0).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(
        store,
        clock,
        format!("{}/json/", server.uri()),
        &[
            format!("{}/first", server.uri()),
            format!("{}/second", server.uri()),
            format!("{}/third", server.uri()),
        ],
    );

    let result = resolver.resolve().await;
    assert_eq!(result.ip, "198.51.100.23");
    let stats = resolver.stats();
    assert_eq!(stats.get_failure_count(ProviderFailure::HttpStatus), 1);
    assert_eq!(stats.get_failure_count(ProviderFailure::MissingIp), 1);
}

#[tokio::test]
async fn test_slow_provider_times_out_and_next_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detailed_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_json(&server, "/ipify", json!({"ip": "203.0.113.50"}), 1).await;

    let cache = TtlCache::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(start_time())),
        CACHE_KEY,
        Duration::from_secs(60),
    );
    let resolver = IpResolver::new(
        test_client(Duration::from_millis(300)),
        cache,
        Provider::detailed(format!("{}/json/", server.uri())),
        vec![Provider::ip_only(format!("{}/ipify", server.uri()))],
    );

    let result = resolver.resolve().await;
    assert_eq!(result.ip, "203.0.113.50");
    assert_eq!(resolver.stats().get_failure_count(ProviderFailure::Timeout), 1);
}

#[tokio::test]
async fn test_all_providers_failing_returns_uncached_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;
    mount_json(&server, "/bogus", json!({"ip": "not-an-ip"}), 1).await;

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let bus = NotificationBus::new();
    let mut notices = bus.subscribe();
    let resolver = test_resolver(
        store.clone(),
        clock,
        format!("{}/json/", server.uri()),
        &[
            format!("{}/html", server.uri()),
            format!("{}/bogus", server.uri()),
        ],
    )
    .with_notifications(bus);

    let result = resolver.resolve().await;
    assert!(result.is_detection_failed());
    assert_eq!(result.ip, "IP Detection Failed");
    assert_eq!(result.city, "Unknown");
    assert_eq!(result.country, "Unknown");
    assert_eq!(result.timezone, "Unknown");
    assert_eq!(result.isp, "Unknown");

    assert_eq!(store.get(CACHE_KEY).unwrap(), None);
    assert_eq!(resolver.stats().total_failures(), 3);
    assert_eq!(resolver.stats().degraded(), 1);

    let notice = notices.try_recv().expect("degraded lookup should notify");
    assert_eq!(notice.level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_unreachable_providers_degrade() {
    // Nothing listens on the discard port
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_time()));
    let resolver = test_resolver(
        store,
        clock,
        "http://127.0.0.1:9/json/".to_string(),
        &["http://127.0.0.1:9/ip".to_string()],
    );

    let result = resolver.resolve().await;
    assert!(result.is_detection_failed());
    assert_eq!(resolver.stats().total_failures(), 2);
}
