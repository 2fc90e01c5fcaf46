//! External data ingestion.
//!
//! - FRED observations and release calendars (`fred`)
//! - incremental refresh of the data directory (`update`)

pub mod fred;
pub mod update;

pub use fred::{FredClient, ObservationSource};
pub use update::*;
