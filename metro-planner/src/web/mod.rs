//! JSON API over the metro network.
//!
//! Station and line listings, route planning and network reloads.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ReloadError, Reloaded};
