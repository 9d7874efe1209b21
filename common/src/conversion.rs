//! Conversion request and response types exchanged with clients.

use serde::{Deserialize, Serialize};

use crate::currency::CurrencyPair;
use crate::error::ValidationError;

/// Body of a conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Amount of the source currency.
    pub amount: f64,
    /// Source fiat symbol, e.g. `RUB`.
    pub from: String,
    /// Target asset symbol, e.g. `USDT`.
    pub to: String,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(amount: f64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Normalize symbols and check the request can be served.
    pub fn validate(&self) -> Result<ValidatedConversion, ValidationError> {
        let from = self.from.trim().to_lowercase();
        let to = self.to.trim().to_lowercase();

        if from.is_empty() {
            return Err(ValidationError::EmptySymbol { field: "from" });
        }
        if to.is_empty() {
            return Err(ValidationError::EmptySymbol { field: "to" });
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }

        Ok(ValidatedConversion {
            amount: self.amount,
            pair: CurrencyPair::from_symbols(&to, &from),
            currency_label: to.to_uppercase(),
        })
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConversion {
    /// Amount of fiat to convert (> 0).
    pub amount: f64,
    /// Pair whose rate prices the conversion.
    pub pair: CurrencyPair,
    /// Upper-cased target symbol as shown to the client.
    pub currency_label: String,
}

/// Successful conversion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub converted_amount: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    pub message: String,
}

impl ConversionResponse {
    /// Build a response asking the client to pay `converted_amount` into `wallet`.
    pub fn payment(converted_amount: f64, currency: impl Into<String>, wallet: &str) -> Self {
        let wallet = Some(wallet.to_string()).filter(|w| !w.is_empty());
        let message = match &wallet {
            Some(w) => format!("Переведите {:.2} на адрес  {}", converted_amount, w),
            None => format!("Переведите {:.2}", converted_amount),
        };

        Self {
            converted_amount,
            currency: currency.into(),
            wallet,
            message,
        }
    }
}

/// Error body returned for any failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
