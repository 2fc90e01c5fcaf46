//! Local persistence.
//!
//! - JSON data directory + atomic writes (`dataset`)
//! - prediction journal store (`journal`)
//! - release schedule provider (`schedule`)

pub mod dataset;
pub mod journal;
pub mod schedule;

pub use dataset::*;
pub use journal::*;
pub use schedule::*;
