// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream endpoint for nearby search
pub const DEFAULT_PLACES_API_URL: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Largest supported number of decimals in a canonical location
pub const MAX_LOCATION_DECIMALS: usize = 8;

/// Longest accepted cache TTL (30 days)
pub const MAX_CACHE_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Longest accepted background refresh timeout (1 hour)
pub const MAX_REFRESH_TIMEOUT_SECONDS: u64 = 60 * 60;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8080)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Google Places API Key
    pub google_places_api_key: String,

    /// Nearby search endpoint the proxy forwards to
    pub places_api_url: String,

    /// TTL applied to every cache write, in seconds (default 600)
    pub cache_ttl_seconds: u64,

    /// Decimal places kept when normalizing a location (default 2, ~1km)
    pub location_decimals: usize,

    /// Upper bound for a background refresh, in seconds
    pub refresh_timeout_seconds: u64,

    /// How often expired entries are swept from the in-memory cache
    pub cache_cleanup_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: parse_var("SERVER_PORT", 8080),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY")
                .unwrap_or_else(|_| String::new()),

            places_api_url: env::var("PLACES_API_URL")
                .unwrap_or_else(|_| DEFAULT_PLACES_API_URL.to_string()),

            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS", 600),

            location_decimals: parse_var("LOCATION_DECIMALS", 2),

            refresh_timeout_seconds: parse_var("REFRESH_TIMEOUT_SECONDS", 10),

            cache_cleanup_interval_seconds: parse_var("CACHE_CLEANUP_INTERVAL_SECONDS", 300),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_seconds == 0 || self.cache_ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(format!(
                "CACHE_TTL_SECONDS must be between 1 and {}",
                MAX_CACHE_TTL_SECONDS
            ));
        }

        if self.refresh_timeout_seconds == 0
            || self.refresh_timeout_seconds > MAX_REFRESH_TIMEOUT_SECONDS
        {
            return Err(format!(
                "REFRESH_TIMEOUT_SECONDS must be between 1 and {}",
                MAX_REFRESH_TIMEOUT_SECONDS
            ));
        }

        if self.cache_cleanup_interval_seconds == 0 {
            return Err("CACHE_CLEANUP_INTERVAL_SECONDS must be greater than zero".to_string());
        }

        if self.location_decimals > MAX_LOCATION_DECIMALS {
            return Err(format!(
                "LOCATION_DECIMALS must be at most {}",
                MAX_LOCATION_DECIMALS
            ));
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - upstream requests will be rejected");
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_seconds)
    }
}

/// Read a variable, falling back to the default when missing or unparsable
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
