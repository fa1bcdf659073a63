//! Configuration Module
//!
//! Handles loading cache and store connection settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which store implementation backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Remote Redis server
    #[default]
    Redis,
    /// In-process store, useful without a server
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown backend: {value}")),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store implementation to use
    pub backend: Backend,
    /// Store address as host:port
    pub address: String,
    /// Store password, empty means no authentication
    pub credential: String,
    /// Logical database selector
    pub database: i64,
    /// Name of the ordered index used by this cache instance
    pub index_name: String,
    /// TTL applied to every write
    pub default_ttl: Duration,
    /// Deadline budget for a single cache operation
    pub op_timeout: Duration,
    /// Memory backend cleanup interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_ADDR` - Store address (default: localhost:6379)
    /// - `REDIS_PASSWORD` - Store password (default: empty)
    /// - `REDIS_DB` - Database selector (default: 0)
    /// - `CACHE_INDEX_NAME` - Ordered index name (default: my-sorted-cache)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_OP_TIMEOUT_MS` - Per-operation deadline in milliseconds (default: 5000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_parse("CACHE_BACKEND").unwrap_or(defaults.backend),
            address: env::var("REDIS_ADDR").unwrap_or(defaults.address),
            credential: env::var("REDIS_PASSWORD").unwrap_or(defaults.credential),
            database: env_parse("REDIS_DB").unwrap_or(defaults.database),
            index_name: env::var("CACHE_INDEX_NAME").unwrap_or(defaults.index_name),
            default_ttl: env_parse("CACHE_DEFAULT_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            op_timeout: env_parse("CACHE_OP_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.op_timeout),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Returns the credential, or None when authentication is disabled.
    pub fn credential(&self) -> Option<&str> {
        if self.credential.is_empty() {
            None
        } else {
            Some(&self.credential)
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Redis,
            address: "localhost:6379".to_string(),
            credential: String::new(),
            database: 0,
            index_name: "my-sorted-cache".to_string(),
            default_ttl: Duration::from_secs(3600),
            op_timeout: Duration::from_millis(5000),
            cleanup_interval: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.address, "localhost:6379");
        assert_eq!(config.database, 0);
        assert_eq!(config.index_name, "my-sorted-cache");
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "CACHE_BACKEND",
            "REDIS_ADDR",
            "REDIS_PASSWORD",
            "REDIS_DB",
            "CACHE_INDEX_NAME",
            "CACHE_DEFAULT_TTL",
            "CACHE_OP_TIMEOUT_MS",
            "CLEANUP_INTERVAL",
        ] {
            env::remove_var(name);
        }

        let config = CacheConfig::from_env();
        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.address, "localhost:6379");
        assert_eq!(config.op_timeout, Duration::from_millis(5000));
        assert_eq!(config.cleanup_interval, 1);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("memory".parse::<Backend>(), Ok(Backend::Memory));
        assert_eq!("REDIS".parse::<Backend>(), Ok(Backend::Redis));
        assert!("etcd".parse::<Backend>().is_err());
    }

    #[test]
    fn test_credential_present() {
        let config = CacheConfig {
            credential: "secret".to_string(),
            ..CacheConfig::default()
        };
        assert_eq!(config.credential(), Some("secret"));
    }
}
