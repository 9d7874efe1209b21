//! Exchange rate values.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::InvalidRateError;

/// Units of fiat currency per one unit of an asset.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    value: f64,
    /// When this rate was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Rate source.
    pub source: String,
}

impl ExchangeRate {
    /// Create a new rate, rejecting zero, negative and non-finite values.
    pub fn new(value: f64, source: impl Into<String>) -> Result<Self, InvalidRateError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(InvalidRateError(value));
        }

        Ok(Self {
            value,
            fetched_at: Utc::now(),
            source: source.into(),
        })
    }

    /// The rate value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// How many asset units `amount` of fiat buys at this rate.
    pub fn convert(&self, amount: f64) -> f64 {
        amount / self.value
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(ExchangeRate::new(0.0, "TEST"), Err(InvalidRateError(0.0)));
        assert!(ExchangeRate::new(-1.5, "TEST").is_err());
        assert!(ExchangeRate::new(f64::NAN, "TEST").is_err());
        assert!(ExchangeRate::new(f64::INFINITY, "TEST").is_err());
    }

    #[test]
    fn test_convert_divides_by_rate() {
        let rate = ExchangeRate::new(90.0, "TEST").unwrap();
        assert_eq!(rate.convert(900.0), 10.0);
        assert_eq!(rate.value(), 90.0);
    }
}
