//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Station;
use crate::fare::FareTable;
use crate::network::{LineInfo, StationRegistry};
use crate::planner::{Itinerary, Strategy};

/// Query for station search.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Substring of the station name
    pub q: String,

    /// Maximum results (default 10, capped at 50)
    pub limit: Option<usize>,
}

/// A station with its position and lines.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub lines: Vec<String>,
    pub is_transfer: bool,
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        let coordinates = station.coordinates();
        Self {
            id: station.id().to_string(),
            name: station.name().to_string(),
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            lines: station
                .memberships()
                .iter()
                .map(|m| m.line_name.to_string())
                .collect(),
            is_transfer: station.is_transfer(),
        }
    }
}

/// Response listing stations.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    /// Network generation the list was taken from
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub stations: Vec<StationResult>,
}

/// A line and its stations in running order.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub name: String,
    pub is_loop: bool,
    pub color: Option<String>,
    pub stations: Vec<String>,
}

impl LineResult {
    pub fn from_line(line: &LineInfo) -> Self {
        Self {
            name: line.name.to_string(),
            is_loop: line.is_loop,
            color: line.color.clone(),
            stations: line.stations.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub generation: u64,
    pub lines: Vec<LineResult>,
}

/// Request to plan a route.
///
/// `from` and `to` take a station id or a station name.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,

    /// Defaults to fewest transfers
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

/// Request to plan a route under every strategy.
#[derive(Debug, Deserialize)]
pub struct RouteAllRequest {
    pub from: String,
    pub to: String,
}

/// A station reference with its display name.
#[derive(Debug, Clone, Serialize)]
pub struct StationRef {
    pub id: String,
    pub name: String,
}

/// A segment with station names and line colour filled in.
#[derive(Debug, Serialize)]
pub struct SegmentView {
    pub line: String,
    pub color: Option<String>,
    pub stations: Vec<StationRef>,
}

/// A planned route as returned to clients.
///
/// The itinerary fields sit at the top level; `segments` and `fare` are
/// presentation extras.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    #[serde(flatten)]
    pub itinerary: Itinerary,
    pub segments: Vec<SegmentView>,
    pub fare: FareTable,
}

impl RouteResult {
    pub fn from_itinerary(itinerary: Itinerary, registry: &StationRegistry) -> Self {
        let segments = itinerary
            .route
            .iter()
            .map(|segment| SegmentView {
                line: segment.line.to_string(),
                color: registry.line_color(&segment.line).map(str::to_string),
                stations: segment
                    .stations
                    .iter()
                    .map(|id| StationRef {
                        id: id.to_string(),
                        name: registry.id_to_name(id).unwrap_or_default().to_string(),
                    })
                    .collect(),
            })
            .collect();
        let fare = FareTable::for_distance(itinerary.total_distance);

        Self {
            itinerary,
            segments,
            fare,
        }
    }
}

/// Response for a single-strategy route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub from: StationRef,
    pub to: StationRef,
    pub strategy: Strategy,

    /// `None` when the stations are not connected
    pub route: Option<RouteResult>,
}

/// Response for all strategies.
#[derive(Debug, Serialize)]
pub struct RouteAllResponse {
    pub from: StationRef,
    pub to: StationRef,
    pub fewest_transfers: Option<RouteResult>,
    pub fewest_stops: Option<RouteResult>,
    pub shortest_distance: Option<RouteResult>,
}

/// Response after reloading the network.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub generation: u64,
    pub stations: usize,
    pub lines: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
