//! Server configuration.
//!
//! Every setting has a default and may be overridden through a
//! `METRO_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::RouteCacheConfig;
use crate::source::{
    DEFAULT_DATA_URL, DEFAULT_TTL, LineSource, NetworkCache, NetworkCacheConfig, SourceClient,
    SourceClientConfig, SourceError,
};

/// Configuration for the HTTP server and its data sources.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `METRO_BIND_ADDR`
    pub bind_addr: SocketAddr,

    /// `METRO_DATA_URL`: the provider's subway document.
    pub data_url: String,

    /// `METRO_DATA_FILE`: when set, the network is read from this
    /// descriptor file and `data_url` is not used.
    pub data_file: Option<PathBuf>,

    /// `METRO_CACHE_PATH`
    pub cache_path: PathBuf,

    /// `METRO_CACHE_TTL_SECS`
    pub cache_ttl: Duration,

    /// `METRO_REFRESH_SECS`: how often to reload the network. Zero
    /// disables periodic reloads.
    pub refresh_interval: Duration,

    /// `METRO_ROUTE_CACHE_CAPACITY`
    pub route_cache_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_url: DEFAULT_DATA_URL.to_string(),
            data_file: None,
            cache_path: PathBuf::from("metro_cache.json"),
            cache_ttl: DEFAULT_TTL,
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            route_cache_capacity: RouteCacheConfig::default().max_capacity,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// Unset or empty variables keep their default. Values that fail to
    /// parse are logged and also keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = parse_var(&get, "METRO_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(url) = get("METRO_DATA_URL") {
            config.data_url = url;
        }
        config.data_file = get("METRO_DATA_FILE").map(PathBuf::from);
        if let Some(path) = get("METRO_CACHE_PATH") {
            config.cache_path = PathBuf::from(path);
        }
        if let Some(secs) = parse_var(&get, "METRO_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&get, "METRO_REFRESH_SECS") {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_var(&get, "METRO_ROUTE_CACHE_CAPACITY") {
            config.route_cache_capacity = capacity;
        }

        config
    }

    /// The data source described by this configuration.
    pub fn line_source(&self) -> Result<LineSource, SourceError> {
        if let Some(path) = &self.data_file {
            return Ok(LineSource::File(path.clone()));
        }

        let client = SourceClient::new(SourceClientConfig::new(&self.data_url))?;
        let cache = NetworkCache::new(
            NetworkCacheConfig::new(&self.cache_path).with_ttl(self.cache_ttl),
        );
        Ok(LineSource::Remote { client, cache })
    }

    pub fn route_cache_config(&self) -> RouteCacheConfig {
        RouteCacheConfig {
            max_capacity: self.route_cache_capacity,
            ..RouteCacheConfig::default()
        }
    }

    /// Periodic reload interval, if enabled.
    pub fn refresh_every(&self) -> Option<Duration> {
        (!self.refresh_interval.is_zero()).then_some(self.refresh_interval)
    }
}

fn parse_var<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid setting");
            None
        }
    }
}
