//! Network data loading.
//!
//! Line data comes from the map provider's subway document, fetched over
//! HTTP and kept in a disk cache, or from a local descriptor file.

mod cache;
mod client;
mod error;
mod provider;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::LineDescriptor;

pub use cache::{DEFAULT_TTL, NetworkCache, NetworkCacheConfig};
pub use client::{DEFAULT_DATA_URL, SourceClient, SourceClientConfig};
pub use error::SourceError;
pub use provider::parse_provider_lines;

/// Read a JSON array of line descriptors from disk.
pub fn load_lines_from_file(path: &Path) -> Result<Vec<LineDescriptor>, SourceError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lines: Vec<LineDescriptor> = serde_json::from_str(&contents)?;
    info!(path = %path.display(), lines = lines.len(), "loaded network from file");
    Ok(lines)
}

/// Where the server gets its network from.
#[derive(Debug, Clone)]
pub enum LineSource {
    /// A local descriptor file, re-read on every load
    File(PathBuf),
    /// The map provider, behind a disk cache
    Remote {
        client: SourceClient,
        cache: NetworkCache,
    },
}

impl LineSource {
    /// Lines from a fresh disk cache, if any. A file source has no cache.
    pub fn cached(&self) -> Option<Vec<LineDescriptor>> {
        match self {
            LineSource::File(_) => None,
            LineSource::Remote { cache, .. } => {
                let lines = cache.load()?;
                info!(path = %cache.path().display(), lines = lines.len(), "loaded network from cache");
                Some(lines)
            }
        }
    }

    /// Read lines from the source itself, bypassing the disk cache.
    pub async fn fetch(&self) -> Result<Vec<LineDescriptor>, SourceError> {
        match self {
            LineSource::File(path) => load_lines_from_file(path),
            LineSource::Remote { client, .. } => client.fetch_lines().await,
        }
    }

    /// Write lines that built into a valid network to the disk cache.
    ///
    /// A failed write is logged and otherwise ignored.
    pub fn store(&self, lines: &[LineDescriptor]) {
        if let LineSource::Remote { cache, .. } = self
            && let Err(e) = cache.save(lines)
        {
            warn!(path = %cache.path().display(), error = %e, "failed to cache network data");
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            LineSource::File(path) => format!("file {}", path.display()),
            LineSource::Remote { client, .. } => format!("provider {}", client.url()),
        }
    }
}
