//! Priority search over (station, line) states.
//!
//! Finds the best route between two stations under one strategy. A state
//! is a station together with the line being ridden, since continuing on
//! the same line costs nothing while switching lines costs a transfer.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::StationId;
use crate::network::StationRegistry;

use super::adjacency::Adjacency;
use super::itinerary::Itinerary;
use super::strategy::{RankKey, Strategy};

/// Error from route planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The station is not part of the loaded network
    #[error("unknown station: {0}")]
    UnknownStation(StationId),
}

/// Best route per strategy for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResults {
    pub fewest_transfers: Option<Itinerary>,
    pub fewest_stops: Option<Itinerary>,
    pub shortest_distance: Option<Itinerary>,
}

impl StrategyResults {
    pub fn get(&self, strategy: Strategy) -> Option<&Itinerary> {
        match strategy {
            Strategy::FewestTransfers => self.fewest_transfers.as_ref(),
            Strategy::FewestStops => self.fewest_stops.as_ref(),
            Strategy::ShortestDistance => self.shortest_distance.as_ref(),
        }
    }
}

/// A partial route. Paths are stored as parent links into the state arena.
#[derive(Debug, Clone, Copy)]
struct SearchState {
    station: usize,
    line: usize,
    parent: Option<usize>,
    distance: f64,
    transfers: usize,
    stops: usize,
}

impl SearchState {
    /// (transfers, stops, distance), compared lexicographically by the memo.
    fn triple(&self) -> (usize, usize, OrderedFloat<f64>) {
        (self.transfers, self.stops, OrderedFloat(self.distance))
    }
}

/// Frontier entry. `seq` is the discovery order and breaks ties left by
/// the strategy's key, so equal candidates pop first-discovered first.
#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    key: RankKey,
    seq: u64,
    state: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we want the lowest key
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route planner over one station registry.
///
/// The adjacency view is derived once at construction and reused for
/// every call to [`Planner::plan`]. The planner never mutates the
/// registry, so one registry can back several planners on different
/// threads.
pub struct Planner<'a> {
    registry: &'a StationRegistry,
    adjacency: Adjacency,
}

impl<'a> Planner<'a> {
    /// Create a planner for `registry`.
    pub fn new(registry: &'a StationRegistry) -> Self {
        let adjacency = Adjacency::from_registry(registry);
        debug!(
            stations = adjacency.station_count(),
            edges = adjacency.edge_count(),
            "derived adjacency"
        );
        Self {
            registry,
            adjacency,
        }
    }

    /// The registry this planner searches.
    pub fn registry(&self) -> &StationRegistry {
        self.registry
    }

    /// Find the best route from `start` to `end` under `strategy`.
    ///
    /// Returns `Ok(None)` when the stations are not connected. Unknown
    /// station ids are reported as [`PlanError::UnknownStation`].
    pub fn plan(
        &self,
        start: &StationId,
        end: &StationId,
        strategy: Strategy,
    ) -> Result<Option<Itinerary>, PlanError> {
        let origin = self
            .adjacency
            .index_of(start)
            .ok_or_else(|| PlanError::UnknownStation(start.clone()))?;
        let destination = self
            .adjacency
            .index_of(end)
            .ok_or_else(|| PlanError::UnknownStation(end.clone()))?;

        Ok(self.search(origin, destination, strategy))
    }

    /// Run every strategy for one pair.
    pub fn plan_all(
        &self,
        start: &StationId,
        end: &StationId,
    ) -> Result<StrategyResults, PlanError> {
        Ok(StrategyResults {
            fewest_transfers: self.plan(start, end, Strategy::FewestTransfers)?,
            fewest_stops: self.plan(start, end, Strategy::FewestStops)?,
            shortest_distance: self.plan(start, end, Strategy::ShortestDistance)?,
        })
    }

    fn search(&self, origin: usize, destination: usize, strategy: Strategy) -> Option<Itinerary> {
        let adj = &self.adjacency;

        let mut states: Vec<SearchState> = Vec::new();
        let mut frontier: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut best: HashMap<(usize, usize), (usize, usize, OrderedFloat<f64>)> =
            HashMap::new();
        let mut seq: u64 = 0;

        let mut push = |states: &mut Vec<SearchState>,
                        frontier: &mut BinaryHeap<Candidate>,
                        state: SearchState| {
            let key = strategy.rank(state.transfers, state.stops, state.distance);
            states.push(state);
            frontier.push(Candidate {
                key,
                seq,
                state: states.len() - 1,
            });
            seq += 1;
        };

        // One starting state per line serving the origin
        for &line in adj.lines_at(origin) {
            push(
                &mut states,
                &mut frontier,
                SearchState {
                    station: origin,
                    line,
                    parent: None,
                    distance: 0.0,
                    transfers: 0,
                    stops: 1,
                },
            );
        }

        let mut expansions = 0usize;

        while let Some(Candidate { state: current, .. }) = frontier.pop() {
            let state = states[current];

            if state.station == destination {
                debug!(
                    strategy = %strategy,
                    expansions,
                    stops = state.stops,
                    transfers = state.transfers,
                    "route found"
                );
                return Some(self.itinerary(&states, current));
            }

            // Skip states that cannot improve on an earlier expansion
            let triple = state.triple();
            match best.get(&(state.station, state.line)) {
                Some(seen) if *seen <= triple => continue,
                _ => {
                    best.insert((state.station, state.line), triple);
                }
            }

            expansions += 1;
            trace!(
                station = %adj.station_id(state.station),
                line = %adj.line_name(state.line),
                transfers = state.transfers,
                stops = state.stops,
                distance = state.distance,
                "expanding"
            );

            for edge in adj.edges_from(state.station) {
                let transfers = if edge.line == state.line {
                    state.transfers
                } else {
                    state.transfers + 1
                };

                push(
                    &mut states,
                    &mut frontier,
                    SearchState {
                        station: edge.to,
                        line: edge.line,
                        parent: Some(current),
                        distance: state.distance + adj.distance_km(state.station, edge.to),
                        transfers,
                        stops: state.stops + 1,
                    },
                );
            }
        }

        debug!(strategy = %strategy, expansions, "no route found");
        None
    }

    /// Walk parent links back from `last` and build the itinerary.
    fn itinerary(&self, states: &[SearchState], last: usize) -> Itinerary {
        let adj = &self.adjacency;

        let mut path = Vec::new();
        let mut cursor = Some(last);
        while let Some(idx) = cursor {
            let state = &states[idx];
            path.push((
                adj.station_id(state.station).clone(),
                adj.line_name(state.line).clone(),
            ));
            cursor = state.parent;
        }
        path.reverse();

        Itinerary::from_path(&path, states[last].distance)
    }
}

/// Plan a single route without keeping the planner around.
pub fn plan(
    registry: &StationRegistry,
    start: &StationId,
    end: &StationId,
    strategy: Strategy,
) -> Result<Option<Itinerary>, PlanError> {
    Planner::new(registry).plan(start, end, strategy)
}

/// Run every strategy for one pair without keeping the planner around.
pub fn plan_all(
    registry: &StationRegistry,
    start: &StationId,
    end: &StationId,
) -> Result<StrategyResults, PlanError> {
    Planner::new(registry).plan_all(start, end)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
