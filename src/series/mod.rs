//! Time-series transforms over indicator series.
//!
//! - range filtering, YoY, yield spread (`transform`)
//! - latest value / last change (`transform`)
//! - display formatting (`format`)

pub mod format;
pub mod transform;

pub use format::*;
pub use transform::*;
