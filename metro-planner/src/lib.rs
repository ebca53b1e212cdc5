//! Metro route planner.
//!
//! Builds a station graph from per-line station data and finds the best
//! route between two stations by fewest transfers, fewest stops or
//! shortest distance. A small JSON API serves the planner over HTTP.

pub mod cache;
pub mod config;
pub mod domain;
pub mod fare;
pub mod network;
pub mod planner;
pub mod source;
pub mod web;
