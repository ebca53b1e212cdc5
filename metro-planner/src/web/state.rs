//! Application state for the web layer.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{RouteCache, RouteCacheConfig};
use crate::network::{NetworkError, NetworkHandle, StationRegistry};
use crate::source::{LineSource, SourceError};

/// Error from loading or reloading the network.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("failed to load network data: {0}")]
    Source(#[from] SourceError),

    #[error("invalid network data: {0}")]
    Network(#[from] NetworkError),
}

/// Outcome of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reloaded {
    pub generation: u64,
    pub stations: usize,
    pub lines: usize,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Current network, swapped on reload
    pub network: NetworkHandle,

    /// Planned routes, keyed by network generation
    pub routes: Arc<RouteCache>,

    /// Where reloads read the network from
    pub source: Arc<LineSource>,
}

impl AppState {
    pub fn new(network: NetworkHandle, routes: RouteCache, source: LineSource) -> Self {
        Self {
            network,
            routes: Arc::new(routes),
            source: Arc::new(source),
        }
    }

    /// Load the network from `source` and build the initial state.
    ///
    /// A cached copy is preferred. Cached lines that no longer build are
    /// discarded in favour of a fresh fetch.
    pub async fn load(source: LineSource, cache: &RouteCacheConfig) -> Result<Self, ReloadError> {
        let cached = source
            .cached()
            .and_then(|lines| match StationRegistry::build(&lines) {
                Ok(registry) => Some(registry),
                Err(e) => {
                    warn!(error = %e, "cached network data is invalid, fetching fresh data");
                    None
                }
            });
        let registry = match cached {
            Some(registry) => registry,
            None => fetch_registry(&source).await?,
        };
        info!(source = %source.describe(), stations = registry.len(), "network loaded");

        Ok(Self::new(
            NetworkHandle::new(registry),
            RouteCache::new(cache),
            source,
        ))
    }

    /// Fetch fresh data and install it as a new generation.
    ///
    /// On failure the current network stays in place.
    pub async fn reload(&self) -> Result<Reloaded, ReloadError> {
        let registry = fetch_registry(&self.source).await?;
        let stations = registry.len();
        let line_count = registry.lines().len();

        let generation = self.network.replace(registry).await;
        // Entries of older generations can never be hit again
        self.routes.invalidate_all();

        Ok(Reloaded {
            generation,
            stations,
            lines: line_count,
        })
    }
}

/// Fetch lines and build them; only lines that build are cached.
async fn fetch_registry(source: &LineSource) -> Result<StationRegistry, ReloadError> {
    let lines = source.fetch().await?;
    let registry = StationRegistry::build(&lines)?;
    source.store(&lines);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineDescriptor;
    use crate::source::{NetworkCache, NetworkCacheConfig, SourceClient, SourceClientConfig};
    use std::path::Path;
    use tempfile::tempdir;

    fn write_lines(path: &Path, lines: &[LineDescriptor]) {
        std::fs::write(path, serde_json::to_string(lines).unwrap()).unwrap();
    }

    fn line(name: &str, stations: &[&str]) -> LineDescriptor {
        stations
            .iter()
            .enumerate()
            .fold(LineDescriptor::new(name, false), |acc, (i, s)| {
                acc.with_station(*s, *s, 34.0 + i as f64 * 0.01, 108.9)
            })
    }

    #[tokio::test]
    async fn load_then_reload_bumps_generation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.json");
        write_lines(&path, &[line("A", &["S1", "S2"])]);

        let state = AppState::load(LineSource::File(path.clone()), &RouteCacheConfig::default())
            .await
            .unwrap();
        assert_eq!(state.network.snapshot().await.generation, 1);

        write_lines(&path, &[line("A", &["S1", "S2"]), line("B", &["S2", "S3"])]);
        let reloaded = state.reload().await.unwrap();
        assert_eq!(
            reloaded,
            Reloaded {
                generation: 2,
                stations: 3,
                lines: 2
            }
        );
        assert_eq!(state.network.snapshot().await.registry.len(), 3);
    }

    #[tokio::test]
    async fn failed_reload_keeps_current_network() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lines.json");
        write_lines(&path, &[line("A", &["S1", "S2"])]);

        let state = AppState::load(LineSource::File(path.clone()), &RouteCacheConfig::default())
            .await
            .unwrap();

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(state.reload().await, Err(ReloadError::Source(_))));

        let bad = LineDescriptor::new("A", false).with_station("S1", "One", "north", 108.9);
        write_lines(&path, &[bad]);
        assert!(matches!(state.reload().await, Err(ReloadError::Network(_))));

        let snapshot = state.network.snapshot().await;
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.registry.len(), 2);
    }

    #[tokio::test]
    async fn missing_source_fails_load() {
        let result = AppState::load(
            LineSource::File("/nonexistent/lines.json".into()),
            &RouteCacheConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(ReloadError::Source(SourceError::Io { .. }))));
    }

    fn remote(cache: &NetworkCache) -> LineSource {
        // Nothing listens on the discard port
        let client = SourceClient::new(
            SourceClientConfig::new("http://127.0.0.1:9/subway.json").with_timeout_secs(2),
        )
        .unwrap();
        LineSource::Remote {
            client,
            cache: cache.clone(),
        }
    }

    #[tokio::test]
    async fn valid_cache_loads_without_fetching() {
        let dir = tempdir().unwrap();
        let cache = NetworkCache::new(NetworkCacheConfig::new(dir.path().join("cache.json")));
        cache.save(&[line("A", &["S1", "S2", "S3"])]).unwrap();

        let state = AppState::load(remote(&cache), &RouteCacheConfig::default())
            .await
            .unwrap();
        assert_eq!(state.network.snapshot().await.registry.len(), 3);
    }

    #[tokio::test]
    async fn invalid_cache_falls_back_to_fetch() {
        let dir = tempdir().unwrap();
        let cache = NetworkCache::new(NetworkCacheConfig::new(dir.path().join("cache.json")));
        let bad = LineDescriptor::new("A", false).with_station("S1", "One", "abc", "def");
        cache.save(&[bad]).unwrap();

        // The cached lines are skipped, so the unreachable provider is hit
        let result = AppState::load(remote(&cache), &RouteCacheConfig::default()).await;
        assert!(matches!(result, Err(ReloadError::Source(SourceError::Http(_)))));
    }

    /// Serve `body` as the provider document on a local port.
    async fn serve_document(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/subway.json", axum::routing::get(move || async move { body }));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/subway.json")
    }

    #[tokio::test]
    async fn unbuildable_fetch_is_not_cached() {
        let url = serve_document(
            r#"{"l": [{"ln": "A", "lo": "0", "st": [{"n": "One", "rs": "S1", "sl": "abc,def"}]}]}"#,
        )
        .await;
        let dir = tempdir().unwrap();
        let cache = NetworkCache::new(NetworkCacheConfig::new(dir.path().join("cache.json")));
        let source = LineSource::Remote {
            client: SourceClient::new(SourceClientConfig::new(url)).unwrap(),
            cache: cache.clone(),
        };

        let result = AppState::load(source, &RouteCacheConfig::default()).await;
        assert!(matches!(result, Err(ReloadError::Network(_))));
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn successful_fetch_is_cached() {
        let url = serve_document(
            r#"{"l": [{"ln": "A", "lo": "0", "st": [
                {"n": "One", "rs": "S1", "sl": "108.90,34.00"},
                {"n": "Two", "rs": "S2", "sl": "108.90,34.01"}]}]}"#,
        )
        .await;
        let dir = tempdir().unwrap();
        let cache = NetworkCache::new(NetworkCacheConfig::new(dir.path().join("cache.json")));
        let source = LineSource::Remote {
            client: SourceClient::new(SourceClientConfig::new(url)).unwrap(),
            cache: cache.clone(),
        };

        let state = AppState::load(source, &RouteCacheConfig::default()).await.unwrap();
        assert_eq!(state.network.snapshot().await.registry.len(), 2);
        assert_eq!(cache.load().unwrap()[0].stations.len(), 2);
    }
}
