//! Route planner using priority search.
//!
//! This module answers: "what is the best way from station A to
//! station B?" for three objectives: fewest transfers, fewest stops and
//! shortest distance.
//!
//! The search runs over (station, line) states on a multigraph derived
//! from the station registry, expanding the cheapest candidate first
//! under the chosen strategy. The first time the destination is taken
//! off the frontier, the route to it is optimal.

mod adjacency;
mod itinerary;
mod search;
mod strategy;

pub use itinerary::{Itinerary, Segment};
pub use search::{PlanError, Planner, StrategyResults, plan, plan_all};
pub use strategy::{InvalidStrategy, Strategy};
