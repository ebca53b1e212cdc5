//! Distance-based fares.
//!
//! Fares are banded by ridden distance in whole kilometres and then
//! reduced by the passenger's fare-card discount.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive, km) and fare of each fixed band.
const BANDS: [(u32, u32); 5] = [(6, 2), (10, 3), (14, 4), (20, 5), (26, 6)];

/// Beyond the last band, one more unit per this many kilometres.
const KM_PER_EXTRA_UNIT: u32 = 8;

/// Error returned when parsing an unknown discount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown discount {0:?}")]
pub struct InvalidDiscount(pub String);

/// Fare-card discount category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Standard single-journey fare
    #[default]
    None,
    /// Stored-value transit card, 10% off
    TransitCard,
    /// Student card, half price
    Student,
    /// Senior card, free
    Senior,
    /// Companion or service card, free
    Companion,
}

impl Discount {
    pub const ALL: [Discount; 5] = [
        Discount::None,
        Discount::TransitCard,
        Discount::Student,
        Discount::Senior,
        Discount::Companion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Discount::None => "none",
            Discount::TransitCard => "transit_card",
            Discount::Student => "student",
            Discount::Senior => "senior",
            Discount::Companion => "companion",
        }
    }

    /// Multiplier applied to the base fare.
    pub fn factor(&self) -> f64 {
        match self {
            Discount::None => 1.0,
            Discount::TransitCard => 0.9,
            Discount::Student => 0.5,
            Discount::Senior | Discount::Companion => 0.0,
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discount {
    type Err = InvalidDiscount;

    /// Accepts the snake-case names or the numeric card codes `0` to `4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "0" => Ok(Discount::None),
            "transit_card" | "1" => Ok(Discount::TransitCard),
            "student" | "2" => Ok(Discount::Student),
            "senior" | "3" => Ok(Discount::Senior),
            "companion" | "4" => Ok(Discount::Companion),
            other => Err(InvalidDiscount(other.to_string())),
        }
    }
}

/// Undiscounted fare for a ride of `km` whole kilometres.
pub fn base_fare(km: u32) -> u32 {
    for (limit, fare) in BANDS {
        if km <= limit {
            return fare;
        }
    }

    let (last_limit, last_fare) = BANDS[BANDS.len() - 1];
    last_fare + (km - last_limit) / KM_PER_EXTRA_UNIT
}

/// Fare for a ride of `distance_km`, with `discount` applied.
///
/// The distance is rounded to the nearest kilometre, halves rounding up.
/// Negative or non-finite distances are charged as zero kilometres.
pub fn fare(distance_km: f64, discount: Discount) -> f64 {
    f64::from(base_fare(whole_km(distance_km))) * discount.factor()
}

/// Standard fare and every discounted fare for one ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareTable {
    pub distance_km: u32,
    pub standard: u32,
    pub transit_card: f64,
    pub student: f64,
    pub senior: f64,
    pub companion: f64,
}

impl FareTable {
    pub fn for_distance(distance_km: f64) -> Self {
        let km = whole_km(distance_km);
        Self {
            distance_km: km,
            standard: base_fare(km),
            transit_card: fare(distance_km, Discount::TransitCard),
            student: fare(distance_km, Discount::Student),
            senior: fare(distance_km, Discount::Senior),
            companion: fare(distance_km, Discount::Companion),
        }
    }
}

fn whole_km(distance_km: f64) -> u32 {
    if distance_km.is_finite() && distance_km > 0.0 {
        // saturating float-to-int cast
        (distance_km + 0.5).floor() as u32
    } else {
        0
    }
}
