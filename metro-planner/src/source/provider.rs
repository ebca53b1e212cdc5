//! Conversion of the map provider's subway document.
//!
//! The provider publishes one document per city:
//!
//! ```json
//! {"l": [{"ln": "Line 2", "lo": "0", "cl": "FF0000",
//!         "st": [{"n": "North Station", "rs": "610100023", "sl": "108.93,34.37"}]}]}
//! ```
//!
//! `sl` holds longitude then latitude. Anything else in the document is
//! ignored.

use serde::Deserialize;
use tracing::debug;

use crate::domain::{CoordinateValue, LineDescriptor, StationEntry};

use super::error::SourceError;

#[derive(Debug, Deserialize)]
struct RawDocument {
    l: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    ln: String,
    #[serde(default)]
    lo: String,
    #[serde(default)]
    cl: Option<String>,
    #[serde(default)]
    st: Vec<RawStation>,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    n: String,
    rs: String,
    sl: String,
}

/// Convert a raw provider document into line descriptors.
///
/// Lines and stations keep their document order. A station listed twice
/// on one line, as loop lines sometimes close with their first stop, is
/// kept once at its first position. Positions are passed on
/// as text and coerced when the registry is built, so a non-numeric
/// position surfaces there with the station it belongs to.
pub fn parse_provider_lines(json: &str) -> Result<Vec<LineDescriptor>, SourceError> {
    let document: RawDocument = serde_json::from_str(json)?;

    document
        .l
        .into_iter()
        .map(|line| {
            let mut descriptor = LineDescriptor::new(line.ln, line.lo.trim() == "1");
            descriptor.color = line.cl.as_deref().and_then(normalise_color);

            for station in line.st {
                let (longitude, latitude) =
                    station
                        .sl
                        .split_once(',')
                        .ok_or_else(|| SourceError::Json {
                            message: format!(
                                "station {}: position {:?} is not \"lon,lat\"",
                                station.rs, station.sl
                            ),
                        })?;

                descriptor.insert_station(
                    station.rs.clone(),
                    StationEntry {
                        station_name: station.n,
                        latitude: CoordinateValue::from(latitude.trim()),
                        longitude: CoordinateValue::from(longitude.trim()),
                        line_id: station.rs,
                    },
                );
            }

            debug!(
                line = %descriptor.line_name,
                stations = descriptor.stations.len(),
                "parsed provider line"
            );
            Ok(descriptor)
        })
        .collect()
}

/// The provider omits the leading `#`; an empty colour means none.
fn normalise_color(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else if raw.starts_with('#') {
        Some(raw.to_string())
    } else {
        Some(format!("#{raw}"))
    }
}
