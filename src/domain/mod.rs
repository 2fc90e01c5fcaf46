//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - observations and indicator series (`DataPoint`, `CombinedData`)
//! - the static indicator catalog (`IndicatorKey`, `IndicatorConfig`)
//! - the flattened point-in-time summary (`DataSnapshot`)
//! - journal, event and AI opinion records (`journal`)

pub mod journal;
pub mod types;

pub use journal::*;
pub use types::*;
