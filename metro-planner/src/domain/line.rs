//! Line descriptors as supplied by the data loader.
//!
//! A `LineDescriptor` is the raw, unvalidated form of one line: its name,
//! whether it is a loop, and its stations in running order. The order of
//! `stations` is significant and is preserved through (de)serialization.

use std::fmt;
use std::num::ParseFloatError;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A coordinate as it appears in upstream data: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    /// Coerce to degrees.
    pub fn to_f64(&self) -> Result<f64, ParseFloatError> {
        match self {
            CoordinateValue::Number(n) => Ok(*n),
            CoordinateValue::Text(s) => s.trim().parse(),
        }
    }
}

impl fmt::Display for CoordinateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateValue::Number(n) => write!(f, "{n}"),
            CoordinateValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CoordinateValue {
    fn from(n: f64) -> Self {
        CoordinateValue::Number(n)
    }
}

impl From<&str> for CoordinateValue {
    fn from(s: &str) -> Self {
        CoordinateValue::Text(s.to_string())
    }
}

/// One stop of a line in upstream data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub station_name: String,
    pub latitude: CoordinateValue,
    pub longitude: CoordinateValue,
    pub line_id: String,
}

/// One line in upstream data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDescriptor {
    pub line_name: String,

    /// The provider encodes this as `"1"`/`"0"`; plain booleans are accepted too.
    #[serde(default, deserialize_with = "deserialize_loop_flag")]
    pub is_loop: bool,

    /// Display colour, e.g. `"#A7D8FF"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Station id to entry, in running order.
    #[serde(with = "ordered_stations")]
    pub stations: Vec<(String, StationEntry)>,
}

impl LineDescriptor {
    /// Create an empty line.
    pub fn new(line_name: impl Into<String>, is_loop: bool) -> Self {
        Self {
            line_name: line_name.into(),
            is_loop,
            color: None,
            stations: Vec::new(),
        }
    }

    /// Insert a stop, keyed by station id.
    ///
    /// A repeated id keeps its first position and takes the newer entry,
    /// so `stations` stays a mapping.
    pub fn insert_station(&mut self, id: String, entry: StationEntry) {
        insert_unique(&mut self.stations, id, entry);
    }

    /// Append a stop, using the station id as the per-line identifier.
    pub fn with_station(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: impl Into<CoordinateValue>,
        longitude: impl Into<CoordinateValue>,
    ) -> Self {
        let id = id.into();
        let entry = StationEntry {
            station_name: name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            line_id: id.clone(),
        };
        self.insert_station(id, entry);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

fn insert_unique(stations: &mut Vec<(String, StationEntry)>, id: String, entry: StationEntry) {
    match stations.iter_mut().find(|(existing, _)| *existing == id) {
        Some((_, slot)) => *slot = entry,
        None => stations.push((id, entry)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoopFlag {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn deserialize_loop_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LoopFlag::deserialize(deserializer)? {
        LoopFlag::Bool(b) => b,
        LoopFlag::Number(n) => n == 1,
        LoopFlag::Text(s) => s.trim() == "1",
    })
}

/// (De)serialize an ordered list of pairs as a JSON object, keeping key order.
mod ordered_stations {
    use super::*;

    pub fn serialize<S>(
        stations: &[(String, StationEntry)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(stations.len()))?;
        for (id, entry) in stations {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Vec<(String, StationEntry)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedVisitor)
    }

    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, StationEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of station id to station entry")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut stations = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, entry)) = access.next_entry::<String, StationEntry>()? {
                insert_unique(&mut stations, id, entry);
            }
            Ok(stations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "line_name": "8号(环)线",
        "is_loop": "1",
        "color": "#E4B93C",
        "stations": {
            "Z": {"station_name": "Zeta", "latitude": "34.30", "longitude": "108.90", "line_id": "z1"},
            "A": {"station_name": "Alpha", "latitude": 34.31, "longitude": 108.91, "line_id": "a1", "line": "8号(环)线"},
            "M": {"station_name": "Mu", "latitude": "34.32", "longitude": "108.92", "line_id": "m1"}
        }
    }"##;

    #[test]
    fn station_order_is_preserved() {
        let line: LineDescriptor = serde_json::from_str(SAMPLE).unwrap();
        let ids: Vec<_> = line.stations.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A", "M"]);
    }

    #[test]
    fn string_loop_flag() {
        let line: LineDescriptor = serde_json::from_str(SAMPLE).unwrap();
        assert!(line.is_loop);
        assert_eq!(line.color.as_deref(), Some("#E4B93C"));

        let json = r#"{"line_name": "1", "is_loop": "0", "stations": {}}"#;
        let line: LineDescriptor = serde_json::from_str(json).unwrap();
        assert!(!line.is_loop);
    }

    #[test]
    fn bool_and_missing_loop_flag() {
        let json = r#"{"line_name": "1", "is_loop": true, "stations": {}}"#;
        let line: LineDescriptor = serde_json::from_str(json).unwrap();
        assert!(line.is_loop);

        let json = r#"{"line_name": "1", "stations": {}}"#;
        let line: LineDescriptor = serde_json::from_str(json).unwrap();
        assert!(!line.is_loop);
    }

    #[test]
    fn mixed_coordinate_representations() {
        let line: LineDescriptor = serde_json::from_str(SAMPLE).unwrap();
        let (_, z) = &line.stations[0];
        let (_, a) = &line.stations[1];
        assert_eq!(z.latitude, CoordinateValue::Text("34.30".into()));
        assert_eq!(a.latitude, CoordinateValue::Number(34.31));
        assert_eq!(z.latitude.to_f64().unwrap(), 34.30);
        assert_eq!(a.longitude.to_f64().unwrap(), 108.91);
    }

    #[test]
    fn non_numeric_coordinate_fails_to_coerce() {
        assert!(CoordinateValue::from("north").to_f64().is_err());
        assert_eq!(CoordinateValue::from(" 12.5 ").to_f64().unwrap(), 12.5);
    }

    #[test]
    fn serialization_keeps_order() {
        let line = LineDescriptor::new("B", false)
            .with_station("S3", "Three", 1.0, 2.0)
            .with_station("S1", "One", 1.5, 2.5);
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.find("\"S3\"").unwrap() < json.find("\"S1\"").unwrap());

        let back: LineDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn repeated_station_keeps_first_position() {
        let json = r#"{"line_name": "C", "is_loop": "1", "stations": {
            "T1": {"station_name": "One", "latitude": 34.0, "longitude": 108.9, "line_id": "t1"},
            "T2": {"station_name": "Two", "latitude": 34.1, "longitude": 108.9, "line_id": "t2"},
            "T1": {"station_name": "One", "latitude": 34.0, "longitude": 108.9, "line_id": "t1b"}
        }}"#;
        let line: LineDescriptor = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = line.stations.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
        assert_eq!(line.stations[0].1.line_id, "t1b");

        let built = LineDescriptor::new("C", true)
            .with_station("T1", "One", 34.0, 108.9)
            .with_station("T2", "Two", 34.1, 108.9)
            .with_station("T1", "One", 34.0, 108.9);
        assert_eq!(built.stations.len(), 2);
    }
}
