//! Graph builder: turns per-line station data into a station registry.
//!
//! The registry is the single source of truth for stations, their
//! coordinates and the lines they serve. It is built wholesale from line
//! descriptors and never mutated afterwards; `NetworkHandle` swaps whole
//! registries on reload.

mod error;
mod handle;
mod registry;

pub use error::NetworkError;
pub use handle::{NetworkHandle, NetworkSnapshot};
pub use registry::{LineInfo, StationRegistry};
