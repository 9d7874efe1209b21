//! FX rate caching with TTL support.

use dashmap::DashMap;
use payrelay_common::ExchangeRate;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cached rate entry. Replaced on refresh, never mutated.
#[derive(Debug, Clone)]
struct CacheEntry {
    rate: ExchangeRate,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(rate: ExchangeRate, ttl: Duration) -> Self {
        Self {
            rate,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// Time a cached rate stays fresh.
    pub ttl: Duration,
    /// Entry count above which expired entries are swept on insert.
    pub max_entries: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 10000,
        }
    }
}

/// Thread-safe rate cache with TTL.
///
/// Expiry is lazy: an expired entry reads as absent and is dropped at that point.
pub struct RateCache {
    cache: DashMap<String, CacheEntry>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Get a rate from cache if it has not expired.
    pub fn get(&self, key: &str) -> Option<ExchangeRate> {
        if let Some(entry) = self.cache.get(key) {
            if entry.is_valid() {
                debug!(key, "Cache hit");
                return Some(entry.rate.clone());
            }

            debug!(key, "Cache entry expired");
            drop(entry);
            // A concurrent set may have refreshed the key in between.
            self.cache.remove_if(key, |_, entry| !entry.is_valid());
            return None;
        }

        debug!(key, "Cache miss");
        None
    }

    /// Insert or replace the rate for `key`.
    pub fn set(&self, key: impl Into<String>, rate: ExchangeRate) {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();
        }

        let key = key.into();
        debug!(key = %key, rate = rate.value(), "Caching rate");
        self.cache.insert(key, CacheEntry::new(rate, self.config.ttl));
    }

    /// Remove a rate from cache.
    pub fn remove(&self, key: &str) {
        self.cache.remove(key);
    }

    /// Clear all cached rates.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of entries in cache, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total.saturating_sub(valid),
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rate(value: f64) -> ExchangeRate {
        ExchangeRate::new(value, "TEST").unwrap()
    }

    fn short_ttl_cache() -> RateCache {
        RateCache::with_config(RateCacheConfig {
            ttl: Duration::from_secs(30),
            ..Default::default()
        })
    }

    #[test]
    fn test_cache_set_and_get() {
        let cache = RateCache::new();
        cache.set("tether_rub", make_rate(123.45));

        let cached = cache.get("tether_rub").unwrap();
        assert_eq!(cached.value(), 123.45);
        assert_eq!(cached.source, "TEST");
    }

    #[test]
    fn test_cache_miss() {
        let cache = RateCache::new();
        assert!(cache.get("tether_rub").is_none());
    }

    #[test]
    fn test_set_replaces_entry() {
        let cache = RateCache::new();
        cache.set("bitcoin_usd", make_rate(60000.0));
        cache.set("bitcoin_usd", make_rate(61000.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("bitcoin_usd").unwrap().value(), 61000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expiry() {
        let cache = short_ttl_cache();
        cache.set("tether_rub", make_rate(90.0));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get("tether_rub").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("tether_rub").is_none());
        // Expired entry is dropped on read.
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_restarts_ttl() {
        let cache = short_ttl_cache();
        cache.set("tether_rub", make_rate(90.0));

        tokio::time::advance(Duration::from_secs(20)).await;
        cache.set("tether_rub", make_rate(91.0));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(cache.get("tether_rub").unwrap().value(), 91.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_and_eviction() {
        let cache = short_ttl_cache();
        cache.set("tether_rub", make_rate(90.0));

        tokio::time::advance(Duration::from_secs(31)).await;
        cache.set("bitcoin_usd", make_rate(60000.0));

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                valid_entries: 1,
                expired_entries: 1,
            }
        );

        cache.evict_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.get("bitcoin_usd").is_some());
    }

    #[test]
    fn test_cache_clear_and_remove() {
        let cache = RateCache::new();
        cache.set("tether_rub", make_rate(90.0));
        cache.set("bitcoin_usd", make_rate(60000.0));

        cache.remove("tether_rub");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(RateCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let key = format!("asset{}_usd", j % 10);
                        cache.set(key.clone(), make_rate((i * 100 + j + 1) as f64));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
    }
}
