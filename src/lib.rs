//! `macro-dash` library crate.
//!
//! The binary (`mdash`) is a thin wrapper around this library so that:
//!
//! - series transforms and snapshot logic are testable without spawning processes
//! - the FRED, journal and model collaborators sit behind traits
//! - the text front-end can be swapped without touching the workflows

pub mod ai;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod series;
pub mod snapshot;
