//! Route optimisation strategies and their frontier ordering.

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy {0:?}: expected fewest_transfers, fewest_stops or shortest_distance")]
pub struct InvalidStrategy(pub String);

/// What a route search optimises for.
///
/// Each strategy orders candidate routes by a primary cost and breaks ties
/// with a secondary cost:
///
/// | Strategy | Primary | Secondary |
/// |---|---|---|
/// | `FewestTransfers` | transfers | stops |
/// | `FewestStops` | stops | transfers |
/// | `ShortestDistance` | distance | transfers |
///
/// Strategies parse from their snake-case names or from the numeric
/// selectors `1`, `2` and `3`:
///
/// ```
/// use metro_planner::planner::Strategy;
///
/// assert_eq!("fewest_stops".parse::<Strategy>().unwrap(), Strategy::FewestStops);
/// assert_eq!("3".parse::<Strategy>().unwrap(), Strategy::ShortestDistance);
/// assert!("fastest".parse::<Strategy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "StrategyRepr")]
pub enum Strategy {
    FewestTransfers,
    FewestStops,
    ShortestDistance,
}

impl Strategy {
    /// All strategies, in selector order.
    pub const ALL: [Strategy; 3] = [
        Strategy::FewestTransfers,
        Strategy::FewestStops,
        Strategy::ShortestDistance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FewestTransfers => "fewest_transfers",
            Strategy::FewestStops => "fewest_stops",
            Strategy::ShortestDistance => "shortest_distance",
        }
    }

    /// Ordering key for a candidate with the given running costs.
    pub(crate) fn rank(&self, transfers: usize, stops: usize, distance: f64) -> RankKey {
        match self {
            Strategy::FewestTransfers => RankKey::Counts(transfers, stops),
            Strategy::FewestStops => RankKey::Counts(stops, transfers),
            Strategy::ShortestDistance => RankKey::Distance(OrderedFloat(distance), transfers),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = InvalidStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fewest_transfers" | "1" => Ok(Strategy::FewestTransfers),
            "fewest_stops" | "2" => Ok(Strategy::FewestStops),
            "shortest_distance" | "3" => Ok(Strategy::ShortestDistance),
            other => Err(InvalidStrategy(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrategyRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<StrategyRepr> for Strategy {
    type Error = InvalidStrategy;

    fn try_from(repr: StrategyRepr) -> Result<Self, Self::Error> {
        match repr {
            StrategyRepr::Code(code) => code.to_string().parse(),
            StrategyRepr::Name(name) => name.parse(),
        }
    }
}

/// Primary and secondary cost of a frontier candidate; lower is better.
///
/// A single search only ever produces one variant, so comparing across
/// variants never happens in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum RankKey {
    Counts(usize, usize),
    Distance(OrderedFloat<f64>, usize),
}
