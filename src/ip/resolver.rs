//! Public IP and geolocation resolution with caching and provider fallback.

use std::sync::Arc;

use crate::config::{Config, IP_CACHE_KEY};
use crate::error_handling::{LookupStats, ProviderError};
use crate::notify::{NoticeLevel, NotificationBus};
use crate::utils::first_success;

use super::cache::{FileStore, SystemClock, TtlCache};
use super::provider::Provider;
use super::types::IpLookupResult;
use super::validate::is_valid_ip;

/// Resolves the client's public IP address and coarse location.
///
/// Resolution order:
/// 1. a fresh cache entry holding a valid address (no network access)
/// 2. the detailed geolocation provider
/// 3. each IP-only provider in priority order
///
/// The first provider yielding a valid address wins and is written through
/// to the cache. If all fail, the sentinel result is returned and nothing is
/// cached.
pub struct IpResolver {
    client: Arc<reqwest::Client>,
    cache: TtlCache<IpLookupResult>,
    providers: Vec<Provider>,
    stats: Arc<LookupStats>,
    notifications: Option<NotificationBus>,
}

impl IpResolver {
    pub fn new(
        client: Arc<reqwest::Client>,
        cache: TtlCache<IpLookupResult>,
        detailed: Provider,
        fallbacks: Vec<Provider>,
    ) -> Self {
        let providers = std::iter::once(detailed).chain(fallbacks).collect();
        IpResolver {
            client,
            cache,
            providers,
            stats: Arc::new(LookupStats::new()),
            notifications: None,
        }
    }

    /// Builds a resolver with a file-backed cache in `config.cache_dir`.
    pub fn from_config(config: &Config, client: Arc<reqwest::Client>) -> Self {
        let cache = TtlCache::new(
            Arc::new(FileStore::new(&config.cache_dir)),
            Arc::new(SystemClock),
            IP_CACHE_KEY,
            config.cache_ttl,
        );
        let fallbacks = config
            .fallback_providers
            .iter()
            .map(Provider::ip_only)
            .collect();
        Self::new(
            client,
            cache,
            Provider::detailed(&config.detailed_provider),
            fallbacks,
        )
    }

    /// Publishes a warning on `bus` whenever resolution degrades to the sentinel.
    pub fn with_notifications(mut self, bus: NotificationBus) -> Self {
        self.notifications = Some(bus);
        self
    }

    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    pub async fn resolve(&self) -> IpLookupResult {
        match self.cache.read() {
            Some(cached) if is_valid_ip(&cached.ip) => {
                log::debug!("IP cache hit for {}", cached.ip);
                self.stats.record_cache_hit();
                return cached;
            }
            Some(cached) => {
                log::warn!("Ignoring cached entry with invalid IP {:?}", cached.ip);
            }
            None => {}
        }
        self.stats.record_cache_miss();

        let client = self.client.as_ref();
        let stats = self.stats.as_ref();
        let outcome = first_success(&self.providers, |provider| async move {
            let result = provider.lookup(client).await;
            if let Err(e) = &result {
                log_provider_failure(stats, e);
            }
            result
        })
        .await;

        match outcome {
            Ok(result) => {
                log::info!("Resolved public IP {} ({})", result.ip, result.country);
                self.cache.write(&result);
                result
            }
            Err(errors) => {
                log::warn!(
                    "IP detection failed: all {} provider(s) failed",
                    errors.len()
                );
                self.stats.record_degraded();
                if let Some(bus) = &self.notifications {
                    bus.publish(
                        NoticeLevel::Warning,
                        "Could not determine your location; continuing without it",
                    );
                }
                IpLookupResult::detection_failed()
            }
        }
    }
}

fn log_provider_failure(stats: &LookupStats, error: &ProviderError) {
    log::warn!("IP lookup failed: {}", error);
    stats.increment_failure(error.failure());
}
