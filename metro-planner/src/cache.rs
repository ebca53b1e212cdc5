//! In-memory cache of planned routes.
//!
//! Entries are keyed on the network generation as well as the query, so a
//! reload never serves routes planned against the previous network. Old
//! generations simply age out through the TTL.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::StationId;
use crate::network::NetworkSnapshot;
use crate::planner::{Itinerary, PlanError, Planner, Strategy, StrategyResults};

/// Cache key: (network generation, start, end, strategy).
type RouteKey = (u64, StationId, StationId, Strategy);

/// Cached outcome. `None` records that no route exists.
type RouteEntry = Arc<Option<Itinerary>>;

/// Error from a cached planning call.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The blocking planner task panicked or was cancelled
    #[error("planner task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Route planner with a result cache in front of it.
pub struct RouteCache {
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl RouteCache {
    pub fn new(config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    /// Plan one route against `snapshot`, using the cache if possible.
    ///
    /// The search runs on the blocking pool so large networks do not stall
    /// the async workers.
    pub async fn plan(
        &self,
        snapshot: Arc<NetworkSnapshot>,
        start: &StationId,
        end: &StationId,
        strategy: Strategy,
    ) -> Result<RouteEntry, RouteError> {
        let key = (snapshot.generation, start.clone(), end.clone(), strategy);

        if let Some(cached) = self.routes.get(&key).await {
            debug!(%start, %end, %strategy, "route cache hit");
            return Ok(cached);
        }

        let (from, to) = (start.clone(), end.clone());
        let itinerary = tokio::task::spawn_blocking(move || {
            Planner::new(&snapshot.registry).plan(&from, &to, strategy)
        })
        .await??;

        let entry = Arc::new(itinerary);
        self.routes.insert(key, Arc::clone(&entry)).await;
        Ok(entry)
    }

    /// Plan every strategy for one pair concurrently.
    pub async fn plan_all(
        &self,
        snapshot: Arc<NetworkSnapshot>,
        start: &StationId,
        end: &StationId,
    ) -> Result<StrategyResults, RouteError> {
        let results = join_all(
            Strategy::ALL.map(|strategy| self.plan(Arc::clone(&snapshot), start, end, strategy)),
        )
        .await;

        let mut found = Vec::with_capacity(results.len());
        for result in results {
            found.push(Option::clone(&*result?));
        }

        // Strategy::ALL order
        let mut found = found.into_iter();
        Ok(StrategyResults {
            fewest_transfers: found.next().flatten(),
            fewest_stops: found.next().flatten(),
            shortest_distance: found.next().flatten(),
        })
    }

    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Drop every cached route.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineDescriptor;
    use crate::network::{NetworkHandle, StationRegistry};

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn network(stations: &[&str]) -> StationRegistry {
        let line = stations
            .iter()
            .enumerate()
            .fold(LineDescriptor::new("A", false), |acc, (i, s)| {
                acc.with_station(*s, *s, 34.0 + i as f64 * 0.01, 108.9)
            });
        StationRegistry::build(&[line]).unwrap()
    }

    #[test]
    fn default_config() {
        let config = RouteCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[tokio::test]
    async fn caches_per_generation() {
        let handle = NetworkHandle::new(network(&["S1", "S2", "S3"]));
        let cache = RouteCache::new(&RouteCacheConfig::default());

        let first = cache
            .plan(handle.snapshot().await, &id("S1"), &id("S3"), Strategy::FewestStops)
            .await
            .unwrap();
        assert_eq!(first.as_ref().as_ref().unwrap().total_stops, 3);

        let again = cache
            .plan(handle.snapshot().await, &id("S1"), &id("S3"), Strategy::FewestStops)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        // A shorter line under the same ids; the old entry must not be reused
        handle.replace(network(&["S1", "S3"])).await;
        let reloaded = cache
            .plan(handle.snapshot().await, &id("S1"), &id("S3"), Strategy::FewestStops)
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.as_ref().as_ref().unwrap().total_stops, 2);
    }

    #[tokio::test]
    async fn caches_missing_routes() {
        let registry = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("S1", "S1", 34.0, 108.9),
            LineDescriptor::new("B", false).with_station("S2", "S2", 35.0, 108.9),
        ])
        .unwrap();
        let handle = NetworkHandle::new(registry);
        let cache = RouteCache::new(&RouteCacheConfig::default());

        let entry = cache
            .plan(handle.snapshot().await, &id("S1"), &id("S2"), Strategy::FewestTransfers)
            .await
            .unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn unknown_station_is_not_cached() {
        let handle = NetworkHandle::new(network(&["S1", "S2"]));
        let cache = RouteCache::new(&RouteCacheConfig::default());

        let err = cache
            .plan(handle.snapshot().await, &id("S1"), &id("NOPE"), Strategy::FewestStops)
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::Plan(PlanError::UnknownStation(_))));

        cache.routes.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn plan_all_fills_every_strategy() {
        let handle = NetworkHandle::new(network(&["S1", "S2", "S3"]));
        let cache = RouteCache::new(&RouteCacheConfig::default());

        let results = cache
            .plan_all(handle.snapshot().await, &id("S1"), &id("S2"))
            .await
            .unwrap();
        for strategy in Strategy::ALL {
            assert_eq!(results.get(strategy).unwrap().total_stops, 2);
        }

        cache.routes.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 3);

        cache.invalidate_all();
        cache.routes.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 0);
    }
}
