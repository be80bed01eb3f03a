//! Configuration types for dnshook
//!
//! This module defines all configuration structures used throughout the crate.
//! The daemon fills them from environment variables; library users can build
//! or deserialize them directly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::model::Hostname;

/// Main dnshook configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Zone resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Processor cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Settings applied to written records
    #[serde(default)]
    pub records: RecordConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Hostname → client token
    #[serde(default)]
    pub authentication: HashMap<String, String>,
}

impl HookConfig {
    /// Create a configuration for a provider with all other settings defaulted
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            resolver: ResolverConfig::default(),
            cache: CacheConfig::default(),
            records: RecordConfig::default(),
            server: ServerConfig::default(),
            authentication: HashMap::new(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.resolver.validate()?;

        if self.cache.capacity == 0 {
            return Err(crate::Error::config("cache capacity must be > 0"));
        }

        if self.records.ttl == 0 {
            return Err(crate::Error::config("record TTL must be > 0"));
        }

        if self.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(crate::Error::config(format!(
                "listen address is not a socket address: {}",
                self.server.listen_addr
            )));
        }

        for (hostname, token) in &self.authentication {
            Hostname::parse(hostname).map_err(|e| {
                crate::Error::config(format!("authentication entry '{}': {}", hostname, e))
            })?;
            if token.is_empty() {
                return Err(crate::Error::config(format!(
                    "authentication token for '{}' cannot be empty",
                    hostname
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut hostnames: Vec<&String> = self.authentication.keys().collect();
        hostnames.sort();
        f.debug_struct("HookConfig")
            .field("provider", &self.provider)
            .field("resolver", &self.resolver)
            .field("cache", &self.cache)
            .field("records", &self.records)
            .field("server", &self.server)
            .field("authentication", &hostnames)
            .finish()
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DNSimple API v2
    Dnsimple {
        /// Account id in API paths
        account_id: String,
        /// Bearer token
        api_token: String,
        /// API base URL (the sandbox lives elsewhere)
        #[serde(default = "default_dnsimple_api_base")]
        api_base: String,
    },

    /// In-memory provider hosting a fixed set of zones
    Memory {
        /// Zone apex names
        zones: Vec<String>,
    },
}

impl ProviderConfig {
    /// DNSimple against the production API
    pub fn dnsimple(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        ProviderConfig::Dnsimple {
            account_id: account_id.into(),
            api_token: api_token.into(),
            api_base: default_dnsimple_api_base(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Dnsimple {
                account_id,
                api_token,
                api_base,
            } => {
                if account_id.is_empty() {
                    return Err(crate::Error::config("DNSimple account id cannot be empty"));
                }
                if api_token.is_empty() {
                    return Err(crate::Error::config("DNSimple API token cannot be empty"));
                }
                if !api_base.starts_with("https://") && !api_base.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "DNSimple API base must be an HTTP(S) URL. Got: {}",
                        api_base
                    )));
                }
                Ok(())
            }
            ProviderConfig::Memory { zones } => {
                for zone in zones {
                    Hostname::parse(zone).map_err(|e| {
                        crate::Error::config(format!("memory zone '{}': {}", zone, e))
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Dnsimple { .. } => "dnsimple",
            ProviderConfig::Memory { .. } => "memory",
        }
    }
}

// Keeps the API token out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Dnsimple {
                account_id,
                api_base,
                ..
            } => f
                .debug_struct("Dnsimple")
                .field("account_id", account_id)
                .field("api_token", &"<REDACTED>")
                .field("api_base", api_base)
                .finish(),
            ProviderConfig::Memory { zones } => {
                f.debug_struct("Memory").field("zones", zones).finish()
            }
        }
    }
}

/// Zone resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Wall-clock budget for the whole zone walk (in seconds)
    #[serde(default = "default_zone_lookup_timeout_secs")]
    pub zone_lookup_timeout_secs: u64,

    /// Timeout of a single SOA query (in milliseconds)
    #[serde(default = "default_soa_query_timeout_ms")]
    pub soa_query_timeout_ms: u64,

    /// Pause before re-asking after a timed-out SOA query (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ResolverConfig {
    pub fn zone_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.zone_lookup_timeout_secs)
    }

    pub fn soa_query_timeout(&self) -> Duration {
        Duration::from_millis(self.soa_query_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_lookup_timeout_secs == 0 {
            return Err(crate::Error::config("zone lookup timeout must be > 0"));
        }
        if self.soa_query_timeout_ms == 0 {
            return Err(crate::Error::config("SOA query timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            zone_lookup_timeout_secs: default_zone_lookup_timeout_secs(),
            soa_query_timeout_ms: default_soa_query_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Processor cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of hostnames with a cached processor
    ///
    /// Sized to the number of hostnames in active use.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Settings applied to written records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    /// TTL for created and updated records (in seconds)
    #[serde(default = "default_record_ttl")]
    pub ttl: u32,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            ttl: default_record_ttl(),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_dnsimple_api_base() -> String {
    "https://api.dnsimple.com/v2".to_string()
}

fn default_zone_lookup_timeout_secs() -> u64 {
    15
}

fn default_soa_query_timeout_ms() -> u64 {
    750
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_cache_capacity() -> usize {
    10
}

fn default_record_ttl() -> u32 {
    60
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}
