//! Completed conversion records.

use chrono::{DateTime, Utc};
use payrelay_common::{ConversionResponse, CurrencyPair, ExchangeRate};
use serde::Serialize;
use uuid::Uuid;

/// Where the rate used by a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// Served from the rate cache.
    Cache,
    /// Fetched from the provider for this request.
    Provider,
}

/// Represents a completed conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Fiat amount supplied by the caller.
    pub amount: f64,
    /// Asset units the amount buys.
    pub converted_amount: f64,
    /// Pair the rate was quoted for.
    pub pair: CurrencyPair,
    /// Upper-cased target symbol.
    pub currency: String,
    /// Rate used for conversion.
    pub rate: ExchangeRate,
    pub origin: RateOrigin,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Convert `amount` at `rate`.
    pub fn new(
        amount: f64,
        pair: CurrencyPair,
        currency: String,
        rate: ExchangeRate,
        origin: RateOrigin,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            amount,
            converted_amount: rate.convert(amount),
            pair,
            currency,
            rate,
            origin,
            executed_at: Utc::now(),
        }
    }

    /// Response asking the caller to pay the converted amount into `wallet`.
    pub fn into_payment_response(self, wallet: &str) -> ConversionResponse {
        ConversionResponse::payment(self.converted_amount, self.currency, wallet)
    }
}
