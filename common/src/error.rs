//! Error types shared across payrelay crates.

use thiserror::Error;

/// A conversion request that cannot be processed as given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A currency symbol is empty.
    #[error("Currency symbol `{field}` must not be empty")]
    EmptySymbol { field: &'static str },

    /// The amount is zero, negative or not a finite number.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    /// The converted amount does not fit in a finite number.
    #[error("Amount {0} is out of range for this rate")]
    AmountOutOfRange(f64),
}

/// A value that cannot be used as an exchange rate.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid exchange rate: {0}")]
pub struct InvalidRateError(pub f64);
