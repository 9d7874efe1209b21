//! Server configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use payrelay_fx::{CoinGeckoConfig, RateCacheConfig};

/// Wallet payments are directed to unless overridden.
pub const DEFAULT_WALLET_ADDRESS: &str = "0x5F6bE5797EDE88B6D9b4aF6cB8e3A9E2b070ac93";

/// Longest rate cache TTL accepted.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(3600);

/// CORS configuration.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://splendid-peony-e3b7a2.netlify.app".to_string(),
                "http://localhost:5173".to_string(),
                "http://172.20.10.2:5173".to_string(),
            ],
        }
    }
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Address returned to clients for payment.
    pub wallet_address: String,
    /// Rate cache configuration.
    pub cache: RateCacheConfig,
    /// Pricing API configuration.
    pub coingecko: CoinGeckoConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            wallet_address: DEFAULT_WALLET_ADDRESS.to_string(),
            cache: RateCacheConfig::default(),
            coingecko: CoinGeckoConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            config.listen_port = port;
        }

        if let Some(wallet) = lookup("PAYMENT_WALLET_ADDRESS") {
            config.wallet_address = wallet;
        }

        if let Some(secs) = lookup("RATE_CACHE_TTL_SECS").and_then(|s| s.parse().ok()) {
            config.cache.ttl = Duration::from_secs(secs);
        }

        if let Some(url) = lookup("COINGECKO_API_URL") {
            config.coingecko.base_url = url;
        }

        config.coingecko.api_key = lookup("COINGECKO_API_KEY").filter(|k| !k.is_empty());

        if let Some(secs) = lookup("PRICE_API_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.coingecko.timeout = Duration::from_secs(secs);
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .map_err(|_| format!("Invalid listen address: {}", self.listen_addr))?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        self.socket_addr()?;

        if self.cache.ttl.is_zero() || self.cache.ttl > MAX_CACHE_TTL {
            return Err(format!(
                "Rate cache TTL must be between 1 and {} seconds",
                MAX_CACHE_TTL.as_secs()
            ));
        }

        if self.coingecko.timeout.is_zero() {
            return Err("Price API timeout cannot be 0".to_string());
        }

        if !self.coingecko.base_url.starts_with("http://")
            && !self.coingecko.base_url.starts_with("https://")
        {
            return Err(format!(
                "Price API URL must be http(s), got {}",
                self.coingecko.base_url
            ));
        }

        Ok(())
    }
}
