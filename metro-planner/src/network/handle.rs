//! Shared, reloadable access to the current station registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use super::registry::StationRegistry;

/// One loaded version of the network.
#[derive(Debug)]
pub struct NetworkSnapshot {
    /// The station registry for this version.
    pub registry: StationRegistry,

    /// Increases by one on every reload.
    pub generation: u64,

    /// When this version was installed.
    pub loaded_at: DateTime<Utc>,
}

/// Thread-safe handle to the current network.
///
/// Readers take an `Arc` to the current snapshot and keep it for as long
/// as they need; a reload installs a new snapshot without touching the
/// old one, so in-flight route searches always see a consistent network.
#[derive(Clone)]
pub struct NetworkHandle {
    inner: Arc<RwLock<Arc<NetworkSnapshot>>>,
}

impl NetworkHandle {
    /// Create a handle holding `registry` as generation 1.
    pub fn new(registry: StationRegistry) -> Self {
        let snapshot = NetworkSnapshot {
            registry,
            generation: 1,
            loaded_at: Utc::now(),
        };
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<NetworkSnapshot> {
        let guard = self.inner.read().await;
        Arc::clone(&*guard)
    }

    /// Install a freshly built registry and return its generation.
    pub async fn replace(&self, registry: StationRegistry) -> u64 {
        let mut guard = self.inner.write().await;
        let generation = guard.generation + 1;
        let stations = registry.len();

        *guard = Arc::new(NetworkSnapshot {
            registry,
            generation,
            loaded_at: Utc::now(),
        });

        info!(generation, stations, "installed new network snapshot");
        generation
    }
}
