//! payrelay FX Engine
//!
//! Exchange rate lookup and conversion for the payrelay service.
//!
//! # Features
//!
//! - Pluggable rate providers, with a CoinGecko implementation
//! - Rate caching with configurable TTL and lazy expiry
//! - Single-flight fetching for concurrent misses on the same pair
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use payrelay_fx::{CoinGeckoConfig, CoinGeckoProvider, FxEngine, RateCache};
//! use payrelay_common::ConversionRequest;
//!
//! let provider = Arc::new(CoinGeckoProvider::new(CoinGeckoConfig::default())?);
//! let engine = FxEngine::new(provider, Arc::new(RateCache::new()));
//!
//! // 900 RUB in USDT
//! let conversion = engine.convert(&ConversionRequest::new(900.0, "rub", "usdt")).await?;
//! ```

pub mod cache;
pub mod coingecko;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;

pub use cache::{RateCache, RateCacheConfig, SharedRateCache};
pub use coingecko::{CoinGeckoConfig, CoinGeckoProvider};
pub use conversion::{Conversion, RateOrigin};
pub use engine::{FxEngine, FxEngineConfig};
pub use error::{FxError, FxResult};
pub use provider::RateProvider;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
