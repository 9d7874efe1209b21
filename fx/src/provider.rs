//! Rate provider traits and implementations.

use async_trait::async_trait;
use payrelay_common::{CurrencyPair, ExchangeRate};

use crate::error::FxResult;

/// Trait for exchange rate sources.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the current rate for a pair. Implementations do not retry.
    async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<ExchangeRate>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateProvider;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::error::FxError;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory rate provider for tests.
    ///
    /// Rates are keyed by the pair's cache key and may be any value, including
    /// zero, so that invalid upstream data can be simulated.
    pub struct MockRateProvider {
        name: String,
        rates: DashMap<String, f64>,
        calls: AtomicUsize,
        failing: AtomicBool,
        latency: Option<Duration>,
    }

    impl MockRateProvider {
        /// Create a new mock provider.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                rates: DashMap::new(),
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
                latency: None,
            }
        }

        /// Delay every fetch by `latency`.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Set a raw rate for a pair.
        pub fn set_rate(&self, pair: &CurrencyPair, value: f64) {
            self.rates.insert(pair.cache_key(), value);
        }

        /// Make every subsequent fetch fail as a transport error would.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of fetches issued so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<ExchangeRate> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            if self.failing.load(Ordering::SeqCst) {
                return Err(FxError::unavailable(pair, "connection refused"));
            }

            let value = self
                .rates
                .get(&pair.cache_key())
                .map(|r| *r)
                .ok_or_else(|| FxError::unavailable(pair, "no rate configured"))?;

            ExchangeRate::new(value, self.name.as_str()).map_err(|e| FxError::InvalidRate {
                pair: pair.clone(),
                value: e.0,
            })
        }
    }
}
