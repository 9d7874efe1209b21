//! Main FX engine implementation.

use std::sync::Arc;

use dashmap::DashMap;
use payrelay_common::{ConversionRequest, CurrencyPair, ExchangeRate, ValidationError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::cache::SharedRateCache;
use crate::conversion::{Conversion, RateOrigin};
use crate::error::FxResult;
use crate::provider::RateProvider;

/// Configuration for the FX engine.
#[derive(Debug, Clone)]
pub struct FxEngineConfig {
    /// Let concurrent misses for the same pair share one provider fetch.
    pub single_flight: bool,
}

impl Default for FxEngineConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
        }
    }
}

/// Looks up rates through the cache and converts amounts with them.
pub struct FxEngine {
    provider: Arc<dyn RateProvider>,
    cache: SharedRateCache,
    /// Per-key gates held while a fetch for that key is in progress.
    inflight: DashMap<String, Arc<Mutex<()>>>,
    config: FxEngineConfig,
}

impl FxEngine {
    /// Create a new engine around an existing cache.
    pub fn new(provider: Arc<dyn RateProvider>, cache: SharedRateCache) -> Self {
        Self::with_config(provider, cache, FxEngineConfig::default())
    }

    /// Create a new engine with custom configuration.
    pub fn with_config(
        provider: Arc<dyn RateProvider>,
        cache: SharedRateCache,
        config: FxEngineConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            inflight: DashMap::new(),
            config,
        }
    }

    /// The cache backing this engine.
    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }

    /// Get the current rate for a pair, fetching it on a cache miss.
    #[instrument(skip(self), fields(pair = %pair))]
    pub async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<(ExchangeRate, RateOrigin)> {
        let key = pair.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            debug!("Using cached rate");
            return Ok((cached, RateOrigin::Cache));
        }

        if !self.config.single_flight {
            return self.fetch_and_cache(pair, key).await;
        }

        let mut gate = InflightGate::join(&self.inflight, &key);
        gate.wait().await;

        // Whoever held the gate before us may have filled the cache.
        match self.cache.get(&key) {
            Some(cached) => {
                debug!("Rate cached by concurrent request");
                Ok((cached, RateOrigin::Cache))
            }
            None => self.fetch_and_cache(pair, key.clone()).await,
        }
    }

    async fn fetch_and_cache(
        &self,
        pair: &CurrencyPair,
        key: String,
    ) -> FxResult<(ExchangeRate, RateOrigin)> {
        let rate = match self.provider.get_rate(pair).await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Failed to fetch rate");
                return Err(e);
            }
        };

        info!(provider = self.provider.name(), rate = rate.value(), "Fetched rate");
        self.cache.set(key, rate.clone());

        Ok((rate, RateOrigin::Provider))
    }

    /// Validate a request and convert its amount into the target asset.
    #[instrument(skip(self), fields(
        from = %request.from,
        to = %request.to,
        amount = request.amount
    ))]
    pub async fn convert(&self, request: &ConversionRequest) -> FxResult<Conversion> {
        let validated = request.validate()?;
        let (rate, origin) = self.get_rate(&validated.pair).await?;

        if !rate.convert(validated.amount).is_finite() {
            return Err(ValidationError::AmountOutOfRange(validated.amount).into());
        }

        let conversion = Conversion::new(
            validated.amount,
            validated.pair,
            validated.currency_label,
            rate,
            origin,
        );

        info!(
            conversion_id = %conversion.id,
            rate = conversion.rate.value(),
            converted_amount = conversion.converted_amount,
            origin = ?conversion.origin,
            "Conversion completed"
        );

        Ok(conversion)
    }
}

/// A task's membership in the single-flight gate for one key.
///
/// Dropping it, whether the request finished or was cancelled, releases the
/// lock and removes the gate once no other task refers to it.
struct InflightGate<'a> {
    inflight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    gate: Option<Arc<Mutex<()>>>,
    permit: Option<OwnedMutexGuard<()>>,
}

impl<'a> InflightGate<'a> {
    fn join(inflight: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let gate = inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        Self {
            inflight,
            key,
            gate: Some(gate),
            permit: None,
        }
    }

    async fn wait(&mut self) {
        if let Some(gate) = &self.gate {
            self.permit = Some(gate.clone().lock_owned().await);
        }
    }
}

impl Drop for InflightGate<'_> {
    fn drop(&mut self) {
        self.permit.take();
        self.gate.take();
        // Only the map's handle is left once the last task is out.
        self.inflight.remove_if(self.key, |_, g| Arc::strong_count(g) == 1);
    }
}
