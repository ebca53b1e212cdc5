//! Domain types for the metro route planner.
//!
//! This module contains the core domain model types that represent
//! validated network data. Identifiers and coordinates enforce their
//! invariants at construction time; `LineDescriptor` is the raw form
//! handed over by the data loader before validation.

mod error;
mod geo;
mod line;
mod station;

pub use error::DomainError;
pub use geo::{Coordinates, EARTH_RADIUS_KM, haversine};
pub use line::{CoordinateValue, LineDescriptor, StationEntry};
pub use station::{LineMembership, LineName, Station, StationId};
