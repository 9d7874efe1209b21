//! FX engine error types.

use payrelay_common::{CurrencyPair, ValidationError};
use thiserror::Error;

/// Errors that can occur in the FX engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// The conversion request is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rate could not be obtained from the provider.
    #[error("Rate not available for {pair}: {reason}")]
    RateUnavailable { pair: CurrencyPair, reason: String },

    /// Provider returned a rate that cannot be used.
    #[error("Invalid rate {value} for {pair}")]
    InvalidRate { pair: CurrencyPair, value: f64 },
}

impl FxError {
    pub(crate) fn unavailable(pair: &CurrencyPair, reason: impl ToString) -> Self {
        FxError::RateUnavailable {
            pair: pair.clone(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error is the caller's fault rather than the rate source's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FxError::Validation(_))
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
