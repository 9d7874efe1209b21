//! payrelay Common Types
//!
//! Shared types for the payrelay conversion relay: currency symbol mapping,
//! exchange rates, and the request/response shapes of the conversion API.

pub mod conversion;
pub mod currency;
pub mod error;
pub mod monetary;

pub use conversion::*;
pub use currency::*;
pub use error::*;
pub use monetary::*;
