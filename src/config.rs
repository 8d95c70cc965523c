//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expired-key sweep interval in seconds
    pub cleanup_interval: u64,
    /// Number of sessions the retention worker keeps
    pub session_limit: usize,
    /// Whether retention also drops shopping carts
    pub clean_carts: bool,
    /// Idle sleep of the retention worker in milliseconds
    pub retention_backoff_ms: u64,
    /// Idle sleep of the row scheduler in milliseconds
    pub row_backoff_ms: u64,
    /// Lifetime of a cached page in seconds
    pub request_cache_ttl: u64,
    /// Pages are cacheable only for items ranked strictly below this
    pub cache_rank_limit: usize,
    /// How long shutdown waits for each worker, in milliseconds
    pub shutdown_grace_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SESSION_LIMIT` - Retained sessions (default: 10000000)
    /// - `CLEAN_CARTS` - Drop carts with sessions (default: true)
    /// - `RETENTION_BACKOFF_MS` - Retention idle sleep (default: 1000)
    /// - `ROW_BACKOFF_MS` - Row scheduler idle sleep (default: 50)
    /// - `REQUEST_CACHE_TTL` - Cached page lifetime in seconds (default: 300)
    /// - `CACHE_RANK_LIMIT` - Popularity rank cutoff (default: 10000)
    /// - `SHUTDOWN_GRACE_MS` - Worker shutdown grace (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            session_limit: env_or("SESSION_LIMIT", defaults.session_limit),
            clean_carts: env_or("CLEAN_CARTS", defaults.clean_carts),
            retention_backoff_ms: env_or("RETENTION_BACKOFF_MS", defaults.retention_backoff_ms),
            row_backoff_ms: env_or("ROW_BACKOFF_MS", defaults.row_backoff_ms),
            request_cache_ttl: env_or("REQUEST_CACHE_TTL", defaults.request_cache_ttl),
            cache_rank_limit: env_or("CACHE_RANK_LIMIT", defaults.cache_rank_limit),
            shutdown_grace_ms: env_or("SHUTDOWN_GRACE_MS", defaults.shutdown_grace_ms),
        }
    }

    pub fn retention_backoff(&self) -> Duration {
        Duration::from_millis(self.retention_backoff_ms)
    }

    pub fn row_backoff(&self) -> Duration {
        Duration::from_millis(self.row_backoff_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
            session_limit: 10_000_000,
            clean_carts: true,
            retention_backoff_ms: 1000,
            row_backoff_ms: 50,
            request_cache_ttl: 300,
            cache_rank_limit: 10_000,
            shutdown_grace_ms: 2000,
        }
    }
}
