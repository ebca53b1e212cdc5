//! Station and line identity types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Coordinates, DomainError};

/// Opaque station identifier, unique across the loaded network.
///
/// # Examples
///
/// ```
/// use metro_planner::domain::StationId;
///
/// let id = StationId::parse("1422 803|1422 803").unwrap();
/// assert_eq!(id.as_str(), "1422 803|1422 803");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier. Empty or whitespace-only input is rejected.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.trim().is_empty() {
            return Err(DomainError::EmptyStationId);
        }
        Ok(StationId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a line, e.g. "2号线" or "Line B".
///
/// Line names are the edge tags of the network: two memberships are on
/// the same line exactly when their names are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineName(String);

impl LineName {
    /// Parse a line name. Empty or whitespace-only input is rejected.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.trim().is_empty() {
            return Err(DomainError::EmptyLineName);
        }
        Ok(LineName(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineName({})", self.0)
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One station's participation in one line.
///
/// `previous` and `next` are the neighbouring stations along the line.
/// On a loop line both are always present; on a terminus-to-terminus line
/// the first stop has no `previous` and the last stop has no `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMembership {
    /// The station this membership belongs to.
    pub station_id: StationId,

    /// The data provider's identifier for this stop on this line.
    pub line_id: String,

    /// The line being served.
    pub line_name: LineName,

    /// Neighbour before this station on the line.
    pub previous: Option<StationId>,

    /// Neighbour after this station on the line.
    pub next: Option<StationId>,
}

impl LineMembership {
    /// Iterate over the neighbours that exist, previous first.
    pub fn neighbours(&self) -> impl Iterator<Item = &StationId> {
        self.previous.iter().chain(self.next.iter())
    }

    /// Returns true if this stop is a terminus of its line.
    pub fn is_terminus(&self) -> bool {
        self.previous.is_none() || self.next.is_none()
    }
}

/// A physical station location.
///
/// A station always has at least one line membership. Memberships are
/// unique by line name; adding a second membership for a line the
/// station already serves is a no-op.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    name: String,
    coordinates: Coordinates,
    memberships: Vec<LineMembership>,
    line_names: HashSet<LineName>,
}

impl Station {
    /// Create a station with its first line membership.
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        coordinates: Coordinates,
        first: LineMembership,
    ) -> Self {
        let mut line_names = HashSet::new();
        line_names.insert(first.line_name.clone());

        Self {
            id,
            name: name.into(),
            coordinates,
            memberships: vec![first],
            line_names,
        }
    }

    /// Add a membership unless one for the same line already exists.
    ///
    /// Returns true if the membership was added.
    pub fn add_membership(&mut self, membership: LineMembership) -> bool {
        if !self.line_names.insert(membership.line_name.clone()) {
            return false;
        }
        self.memberships.push(membership);
        true
    }

    pub fn id(&self) -> &StationId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Line memberships in the order they were first encountered.
    pub fn memberships(&self) -> &[LineMembership] {
        &self.memberships
    }

    /// The membership for a given line, if the station serves it.
    pub fn membership(&self, line: &LineName) -> Option<&LineMembership> {
        self.memberships.iter().find(|m| &m.line_name == line)
    }

    /// Returns true if the station is served by `line`.
    pub fn serves(&self, line: &LineName) -> bool {
        self.line_names.contains(line)
    }

    /// Names of the lines serving this station, in membership order.
    pub fn line_names(&self) -> impl Iterator<Item = &LineName> {
        self.memberships.iter().map(|m| &m.line_name)
    }

    /// A transfer station is served by two or more lines.
    pub fn is_transfer(&self) -> bool {
        self.memberships.len() >= 2
    }
}
