//! Currency symbols and the pairs used to look up exchange rates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between asset id and fiat symbol in a cache key.
pub const CACHE_KEY_SEPARATOR: char = '_';

/// Map a ticker symbol to the identifier used by the pricing API.
///
/// Matching is case-insensitive. Unknown symbols map to themselves, lower-cased.
pub fn currency_id(symbol: &str) -> String {
    let symbol = symbol.to_lowercase();
    match symbol.as_str() {
        "usdt" => "tether".to_string(),
        "btc" => "bitcoin".to_string(),
        "eth" => "ethereum".to_string(),
        _ => symbol,
    }
}

/// An asset/fiat pair as understood by the pricing API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Asset identifier (e.g. `tether`).
    pub asset: String,
    /// Fiat symbol the asset is quoted in (e.g. `rub`).
    pub fiat: String,
}

impl CurrencyPair {
    /// Create a pair from an already mapped asset id and fiat symbol.
    pub fn new(asset: impl Into<String>, fiat: impl Into<String>) -> Self {
        Self {
            asset: asset.into().to_lowercase(),
            fiat: fiat.into().to_lowercase(),
        }
    }

    /// Build the pair for converting `from` fiat into the `to` asset.
    pub fn from_symbols(to: &str, from: &str) -> Self {
        Self::new(currency_id(to), from)
    }

    /// Key under which the rate for this pair is cached, e.g. `tether_rub`.
    pub fn cache_key(&self) -> String {
        format!("{}{}{}", self.asset, CACHE_KEY_SEPARATOR, self.fiat)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.fiat)
    }
}
