//! payrelay Server
//!
//! HTTP front end of the relay: accepts conversion requests, prices them
//! through the FX engine and answers with the amount to pay and where to pay it.

pub mod api;
pub mod config;

pub use api::{router, AppState};
pub use config::ServerConfig;
