//! Line-tagged adjacency derived from a station registry.
//!
//! Stations and lines are interned to dense indices so the search can
//! key its frontier and memo table on plain integers.

use std::collections::HashMap;

use crate::domain::{Coordinates, LineName, StationId};
use crate::network::StationRegistry;

/// A directed edge to a neighbouring station along one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub to: usize,
    pub line: usize,
}

/// Multigraph view of the network.
///
/// Every line membership contributes an edge to its previous and to its
/// next station, tagged with the line. Two stations joined by two lines
/// therefore have two parallel edges.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    station_ids: Vec<StationId>,
    station_index: HashMap<StationId, usize>,
    coordinates: Vec<Coordinates>,
    lines: Vec<LineName>,
    /// Lines serving each station, in membership order.
    station_lines: Vec<Vec<usize>>,
    edges: Vec<Vec<Edge>>,
}

impl Adjacency {
    pub fn from_registry(registry: &StationRegistry) -> Self {
        let mut line_index: HashMap<LineName, usize> = HashMap::new();
        let mut lines = Vec::new();
        let mut intern_line = |name: &LineName| {
            *line_index.entry(name.clone()).or_insert_with(|| {
                lines.push(name.clone());
                lines.len() - 1
            })
        };

        let station_ids: Vec<StationId> = registry.iter().map(|s| s.id().clone()).collect();
        let station_index: HashMap<StationId, usize> = station_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut coordinates = Vec::with_capacity(station_ids.len());
        let mut station_lines = Vec::with_capacity(station_ids.len());
        let mut edges = Vec::with_capacity(station_ids.len());

        for station in registry.iter() {
            coordinates.push(station.coordinates());

            let mut served = Vec::new();
            let mut out = Vec::new();
            for membership in station.memberships() {
                let line = intern_line(&membership.line_name);
                served.push(line);

                // Neighbours missing from the registry cannot be reached
                for neighbour in membership.neighbours() {
                    if let Some(&to) = station_index.get(neighbour) {
                        out.push(Edge { to, line });
                    }
                }
            }

            station_lines.push(served);
            edges.push(out);
        }

        Self {
            station_ids,
            station_index,
            coordinates,
            lines,
            station_lines,
            edges,
        }
    }

    pub fn index_of(&self, id: &StationId) -> Option<usize> {
        self.station_index.get(id).copied()
    }

    pub fn station_id(&self, index: usize) -> &StationId {
        &self.station_ids[index]
    }

    pub fn line_name(&self, index: usize) -> &LineName {
        &self.lines[index]
    }

    pub fn lines_at(&self, station: usize) -> &[usize] {
        &self.station_lines[station]
    }

    pub fn edges_from(&self, station: usize) -> &[Edge] {
        &self.edges[station]
    }

    /// Great-circle distance between two stations in kilometres.
    pub fn distance_km(&self, from: usize, to: usize) -> f64 {
        self.coordinates[from].distance_km(&self.coordinates[to])
    }

    pub fn station_count(&self) -> usize {
        self.station_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }
}
