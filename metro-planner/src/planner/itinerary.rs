//! Itinerary types produced by the planner.

use serde::{Deserialize, Serialize};

use crate::domain::{LineName, StationId};

/// A run of stations ridden on one line without changing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub line: LineName,
    pub stations: Vec<StationId>,
}

/// A planned route: its segments plus aggregate totals.
///
/// Serializes as
/// `{"route": [{"line", "stations"}...], "total_stops", "total_distance", "transfers"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub route: Vec<Segment>,

    /// Number of station visits on the path, counting the origin as 1.
    pub total_stops: usize,

    /// Kilometres, rounded to 5 decimal places.
    pub total_distance: f64,

    /// Segment count minus one.
    pub transfers: usize,
}

impl Itinerary {
    /// Assemble an itinerary from a path of (station, line) visits.
    ///
    /// Consecutive visits on the same line form one segment. When the line
    /// changes, the new segment opens at the station where the change was
    /// made, so every segment lists where it was boarded.
    pub(crate) fn from_path(path: &[(StationId, LineName)], distance_km: f64) -> Self {
        let mut route: Vec<Segment> = Vec::new();

        for (station, line) in path {
            if let Some(segment) = route.last_mut()
                && &segment.line == line
            {
                segment.stations.push(station.clone());
                continue;
            }

            let boarded = route.last().and_then(|s| s.stations.last().cloned());
            route.push(Segment {
                line: line.clone(),
                stations: boarded.into_iter().chain([station.clone()]).collect(),
            });
        }

        let transfers = route.len().saturating_sub(1);
        Self {
            route,
            total_stops: path.len(),
            total_distance: round_km(distance_km),
            transfers,
        }
    }

    /// First station of the route.
    pub fn origin(&self) -> Option<&StationId> {
        self.route.first().and_then(|s| s.stations.first())
    }

    /// Last station of the route.
    pub fn destination(&self) -> Option<&StationId> {
        self.route.last().and_then(|s| s.stations.last())
    }

    /// Returns true if the whole route is ridden on one line.
    pub fn is_direct(&self) -> bool {
        self.route.len() <= 1
    }

    /// Lines used, in riding order.
    pub fn lines(&self) -> impl Iterator<Item = &LineName> {
        self.route.iter().map(|s| &s.line)
    }
}

fn round_km(km: f64) -> f64 {
    (km * 100_000.0).round() / 100_000.0
}
