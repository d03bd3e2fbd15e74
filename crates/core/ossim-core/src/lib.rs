//! ossim Core - Shared model types
//!
//! This crate defines the data the simulation engines exchange:
//! - Jobs and their per-run timing fields (CPU scheduling)
//! - Partitions, free lists and allocation outcomes (memory allocation)
//! - Page numbers (page replacement)
//! - Configuration errors raised before a simulation starts

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
