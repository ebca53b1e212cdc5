//! Station registry and the graph builder that produces it.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::domain::{
    CoordinateValue, Coordinates, DomainError, LineDescriptor, LineMembership, LineName, Station,
    StationId,
};

use super::error::NetworkError;

/// A line as recorded in the registry.
#[derive(Debug, Clone)]
pub struct LineInfo {
    pub name: LineName,
    pub is_loop: bool,
    pub color: Option<String>,
    /// Station ids in running order.
    pub stations: Vec<StationId>,
}

/// All stations of a loaded network, keyed by station id.
///
/// Iteration follows build order: the order in which stations were first
/// encountered while scanning the line data. The registry is immutable
/// once built; reloading builds a new one.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>,
    index: HashMap<StationId, usize>,
    lines: Vec<LineInfo>,
    line_index: HashMap<LineName, usize>,
}

impl StationRegistry {
    /// Build a registry from line descriptors.
    ///
    /// For each line the stations are linked to their neighbours in the
    /// given order. Loop lines wrap around so the first and last stations
    /// are adjacent; other lines leave the ends open. A station seen on
    /// several lines gets one membership per distinct line name.
    pub fn build(lines: &[LineDescriptor]) -> Result<Self, NetworkError> {
        let mut registry = StationRegistry::default();

        for line in lines {
            registry.add_line(line)?;
        }

        info!(
            stations = registry.len(),
            lines = registry.lines.len(),
            transfers = registry.transfer_stations().count(),
            "built station registry"
        );

        Ok(registry)
    }

    fn add_line(&mut self, line: &LineDescriptor) -> Result<(), NetworkError> {
        let invalid = |source: DomainError| NetworkError::InvalidRecord {
            line: line.line_name.clone(),
            source,
        };

        let line_name = LineName::parse(&line.line_name).map_err(invalid)?;
        let ids = line
            .stations
            .iter()
            .map(|(id, _)| StationId::parse(id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let n = ids.len();
        debug!(line = %line_name, stations = n, is_loop = line.is_loop, "adding line");

        for (idx, (id, (_, entry))) in ids.iter().zip(&line.stations).enumerate() {
            let (previous, next) = neighbour_indices(idx, n, line.is_loop);
            let latitude = parse_coordinate(id, "latitude", &entry.latitude)?;
            let longitude = parse_coordinate(id, "longitude", &entry.longitude)?;

            let membership = LineMembership {
                station_id: id.clone(),
                line_id: entry.line_id.clone(),
                line_name: line_name.clone(),
                previous: previous.map(|i| ids[i].clone()),
                next: next.map(|i| ids[i].clone()),
            };

            match self.index.get(id) {
                Some(&pos) => {
                    if !self.stations[pos].add_membership(membership) {
                        debug!(
                            station = %id,
                            line = %line_name,
                            "duplicate line membership ignored"
                        );
                    }
                }
                None => {
                    let coordinates = Coordinates::new(latitude, longitude).map_err(invalid)?;

                    self.index.insert(id.clone(), self.stations.len());
                    self.stations.push(Station::new(
                        id.clone(),
                        entry.station_name.clone(),
                        coordinates,
                        membership,
                    ));
                }
            }
        }

        if self.line_index.contains_key(&line_name) {
            warn!(line = %line_name, "line appears more than once in network data");
        } else {
            self.line_index.insert(line_name.clone(), self.lines.len());
            self.lines.push(LineInfo {
                name: line_name,
                is_loop: line.is_loop,
                color: line.color.clone(),
                stations: ids,
            });
        }

        Ok(())
    }

    /// Look up a station by id.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.index.get(id).map(|&pos| &self.stations[pos])
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve a station id to its display name.
    pub fn id_to_name(&self, id: &StationId) -> Option<&str> {
        self.get(id).map(Station::name)
    }

    /// Resolve a display name to a station id.
    ///
    /// Names are not unique: when several stations share a name, the one
    /// built first wins.
    pub fn name_to_id(&self, name: &str) -> Option<&StationId> {
        self.stations
            .iter()
            .find(|s| s.name() == name)
            .map(Station::id)
    }

    /// Stations in build order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Stations served by two or more lines.
    pub fn transfer_stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter().filter(|s| s.is_transfer())
    }

    /// Lines in build order.
    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    pub fn line(&self, name: &LineName) -> Option<&LineInfo> {
        self.line_index.get(name).map(|&pos| &self.lines[pos])
    }

    /// Station ids of a line in running order.
    pub fn stations_on_line(&self, name: &LineName) -> Option<&[StationId]> {
        self.line(name).map(|l| l.stations.as_slice())
    }

    /// Display colour of a line, if the data supplied one.
    pub fn line_color(&self, name: &LineName) -> Option<&str> {
        self.line(name).and_then(|l| l.color.as_deref())
    }

    /// Find stations whose name contains `query`, case-insensitively.
    ///
    /// Names starting with the query are listed before other matches;
    /// within each group build order is kept.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Station> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let (mut prefix, contains): (Vec<&Station>, Vec<&Station>) = self
            .stations
            .iter()
            .filter(|s| s.name().to_lowercase().contains(&query))
            .partition(|s| s.name().to_lowercase().starts_with(&query));

        prefix.extend(contains);
        prefix.truncate(limit);
        prefix
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Indices of the previous and next stop for position `idx` on a line of `n` stops.
fn neighbour_indices(idx: usize, n: usize, is_loop: bool) -> (Option<usize>, Option<usize>) {
    if is_loop {
        (Some((idx + n - 1) % n), Some((idx + 1) % n))
    } else {
        let previous = idx.checked_sub(1);
        let next = if idx + 1 < n { Some(idx + 1) } else { None };
        (previous, next)
    }
}

fn parse_coordinate(
    station: &StationId,
    field: &'static str,
    value: &CoordinateValue,
) -> Result<f64, NetworkError> {
    value.to_f64().map_err(|_| NetworkError::InvalidCoordinate {
        station: station.to_string(),
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn line(s: &str) -> LineName {
        LineName::parse(s).unwrap()
    }

    fn chain(name: &str, is_loop: bool, stations: &[&str]) -> LineDescriptor {
        stations
            .iter()
            .enumerate()
            .fold(LineDescriptor::new(name, is_loop), |acc, (i, s)| {
                let offset = i as f64 * 0.01;
                acc.with_station(*s, format!("{s} Station"), 34.0 + offset, 108.0 + offset)
            })
    }

    fn membership<'a>(
        registry: &'a StationRegistry,
        station: &str,
        l: &str,
    ) -> &'a LineMembership {
        registry
            .get(&id(station))
            .unwrap()
            .membership(&line(l))
            .unwrap()
    }

    #[test]
    fn non_loop_line_has_open_ends() {
        let registry = StationRegistry::build(&[chain("A", false, &["S1", "S2", "S3"])]).unwrap();

        let first = membership(&registry, "S1", "A");
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(id("S2")));

        let middle = membership(&registry, "S2", "A");
        assert_eq!(middle.previous, Some(id("S1")));
        assert_eq!(middle.next, Some(id("S3")));

        let last = membership(&registry, "S3", "A");
        assert_eq!(last.previous, Some(id("S2")));
        assert_eq!(last.next, None);
    }

    #[test]
    fn loop_line_forms_ring() {
        let registry =
            StationRegistry::build(&[chain("C", true, &["T1", "T2", "T3", "T4"])]).unwrap();

        assert_eq!(membership(&registry, "T1", "C").previous, Some(id("T4")));
        assert_eq!(membership(&registry, "T4", "C").next, Some(id("T1")));
        assert!(
            registry
                .iter()
                .flat_map(|s| s.memberships())
                .all(|m| m.previous.is_some() && m.next.is_some())
        );
    }

    #[test]
    fn single_station_lines() {
        let registry = StationRegistry::build(&[
            chain("Solo", false, &["X"]),
            chain("Ring", true, &["Y"]),
        ])
        .unwrap();

        let solo = membership(&registry, "X", "Solo");
        assert_eq!((solo.previous.clone(), solo.next.clone()), (None, None));

        let ring = membership(&registry, "Y", "Ring");
        assert_eq!(ring.previous, Some(id("Y")));
        assert_eq!(ring.next, Some(id("Y")));
    }

    #[test]
    fn empty_line_is_harmless() {
        let registry = StationRegistry::build(&[LineDescriptor::new("Empty", true)]).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.lines().len(), 1);
    }

    #[test]
    fn transfer_station_collects_memberships() {
        let registry = StationRegistry::build(&[
            chain("A", false, &["S1", "S2", "S3"]),
            chain("B", false, &["S3", "S4", "S5"]),
        ])
        .unwrap();

        assert_eq!(registry.len(), 5);
        let s3 = registry.get(&id("S3")).unwrap();
        assert!(s3.is_transfer());
        let lines: Vec<_> = s3.line_names().map(LineName::as_str).collect();
        assert_eq!(lines, vec!["A", "B"]);

        let transfers: Vec<_> = registry.transfer_stations().map(|s| s.id().as_str()).collect();
        assert_eq!(transfers, vec!["S3"]);
    }

    #[test]
    fn reprocessing_a_line_never_duplicates_memberships() {
        let a = chain("A", false, &["S1", "S2", "S3"]);
        let registry = StationRegistry::build(&[a.clone(), a]).unwrap();

        for station in registry.iter() {
            assert_eq!(station.memberships().len(), 1);
        }
        assert_eq!(registry.lines().len(), 1);
    }

    #[test]
    fn coordinates_are_fixed_at_creation() {
        let registry = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("S1", "One", 34.0, 108.0),
            LineDescriptor::new("B", false).with_station("S1", "One", 35.0, 109.0),
        ])
        .unwrap();

        let coords = registry.get(&id("S1")).unwrap().coordinates();
        assert_eq!((coords.latitude(), coords.longitude()), (34.0, 108.0));
    }

    #[test]
    fn string_coordinates_are_coerced() {
        let registry = StationRegistry::build(&[LineDescriptor::new("A", false).with_station(
            "S1",
            "One",
            "34.25",
            " 108.5",
        )])
        .unwrap();

        let coords = registry.get(&id("S1")).unwrap().coordinates();
        assert_eq!((coords.latitude(), coords.longitude()), (34.25, 108.5));
    }

    #[test]
    fn malformed_coordinate_is_hard_failure() {
        let result = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("S1", "One", "34.0", "east"),
        ]);

        assert_eq!(
            result.unwrap_err(),
            NetworkError::InvalidCoordinate {
                station: "S1".into(),
                field: "longitude",
                value: "east".into(),
            }
        );
    }

    #[test]
    fn malformed_coordinate_on_known_station_still_fails() {
        let result = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("S1", "One", 34.0, 108.0),
            LineDescriptor::new("B", false).with_station("S1", "One", "?", 108.0),
        ]);
        assert!(matches!(
            result,
            Err(NetworkError::InvalidCoordinate { field: "latitude", .. })
        ));
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let result = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("S1", "One", 134.0, 108.0),
        ]);
        assert!(matches!(result, Err(NetworkError::InvalidRecord { .. })));
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let result = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("", "One", 34.0, 108.0),
        ]);
        assert_eq!(
            result.unwrap_err(),
            NetworkError::InvalidRecord {
                line: "A".into(),
                source: DomainError::EmptyStationId,
            }
        );

        let result = StationRegistry::build(&[LineDescriptor::new(" ", false)]);
        assert!(matches!(
            result,
            Err(NetworkError::InvalidRecord {
                source: DomainError::EmptyLineName,
                ..
            })
        ));
    }

    #[test]
    fn id_and_name_lookups() {
        let registry = StationRegistry::build(&[chain("A", false, &["S1", "S2"])]).unwrap();

        assert_eq!(registry.id_to_name(&id("S1")), Some("S1 Station"));
        assert_eq!(registry.id_to_name(&id("missing")), None);
        assert_eq!(registry.name_to_id("S2 Station"), Some(&id("S2")));
        assert_eq!(registry.name_to_id("Nowhere"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_first_built() {
        let registry = StationRegistry::build(&[
            LineDescriptor::new("A", false).with_station("north", "Shared", 34.0, 108.0),
            LineDescriptor::new("B", false).with_station("south", "Shared", 33.0, 108.0),
        ])
        .unwrap();

        assert_eq!(registry.name_to_id("Shared"), Some(&id("north")));
    }

    #[test]
    fn lines_keep_order_and_color() {
        let registry = StationRegistry::build(&[
            chain("B", false, &["S1", "S2"]).with_color("#FF0000"),
            chain("A", true, &["S2", "S3"]),
        ])
        .unwrap();

        let names: Vec<_> = registry.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(registry.line_color(&line("B")), Some("#FF0000"));
        assert_eq!(registry.line_color(&line("A")), None);
        assert!(registry.line(&line("A")).unwrap().is_loop);
        assert_eq!(
            registry.stations_on_line(&line("B")),
            Some(&[id("S1"), id("S2")][..])
        );
        assert_eq!(registry.stations_on_line(&line("Z")), None);
    }

    #[test]
    fn search_ranks_prefix_matches_first() {
        let registry = StationRegistry::build(&[LineDescriptor::new("A", false)
            .with_station("1", "Xiaozhai", 34.22, 108.94)
            .with_station("2", "North Xi'an", 34.35, 108.93)
            .with_station("3", "Xi'an Station", 34.28, 108.96)])
        .unwrap();

        let found: Vec<_> = registry.search("xi", 10).iter().map(|s| s.name()).collect();
        assert_eq!(found, vec!["Xiaozhai", "Xi'an Station", "North Xi'an"]);

        assert_eq!(registry.search("xi", 1).len(), 1);
        assert!(registry.search("  ", 10).is_empty());
        assert!(registry.search("zzz", 10).is_empty());
    }
}
