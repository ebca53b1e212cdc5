//! Disk-based cache for parsed network data.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::LineDescriptor;

use super::error::SourceError;

/// Default cache TTL: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct CachedLines {
    /// Unix timestamp when the cache was written.
    cached_at_secs: u64,
    lines: Vec<LineDescriptor>,
}

/// Configuration for the network disk cache.
#[derive(Debug, Clone)]
pub struct NetworkCacheConfig {
    pub path: PathBuf,
    /// How long a written cache stays valid.
    pub ttl: Duration,
}

impl NetworkCacheConfig {
    /// Cache at `path` with the default TTL (24 hours).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for NetworkCacheConfig {
    fn default() -> Self {
        Self::new("metro_cache.json")
    }
}

/// Disk cache for the line descriptors of one network.
#[derive(Debug, Clone)]
pub struct NetworkCache {
    config: NetworkCacheConfig,
}

impl NetworkCache {
    pub fn new(config: NetworkCacheConfig) -> Self {
        Self { config }
    }

    /// Load cached lines.
    ///
    /// Returns `None` if the cache is missing, unreadable or expired.
    pub fn load(&self) -> Option<Vec<LineDescriptor>> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let cached: CachedLines = match serde_json::from_str(&contents) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(path = %self.config.path.display(), error = %e, "ignoring unreadable cache");
                return None;
            }
        };

        let age_secs = unix_now().ok()?.saturating_sub(cached.cached_at_secs);
        if age_secs >= self.config.ttl.as_secs() {
            debug!(path = %self.config.path.display(), age_secs, "cache expired");
            return None;
        }

        Some(cached.lines)
    }

    /// Write lines to the cache, creating parent directories as needed.
    pub fn save(&self, lines: &[LineDescriptor]) -> Result<(), SourceError> {
        let cached = CachedLines {
            cached_at_secs: unix_now()?,
            lines: lines.to_vec(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SourceError::Cache {
                message: format!("failed to create cache directory: {e}"),
            })?;
        }

        let json = serde_json::to_string(&cached).map_err(|e| SourceError::Cache {
            message: format!("failed to serialize cache: {e}"),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| SourceError::Cache {
            message: format!("failed to write cache file: {e}"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}

fn unix_now() -> Result<u64, SourceError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| SourceError::Cache {
            message: "system time before unix epoch".to_string(),
        })
}
