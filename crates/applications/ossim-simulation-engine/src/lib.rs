//! ossim Simulation Engine
//!
//! Deterministic re-players of three classic OS resource-management problems:
//! - [`scheduling`]: FIFO, SJF, HRRN, Round-Robin and static Priority CPU scheduling
//! - [`allocation`]: First-Fit, Best-Fit and Worst-Fit contiguous partition placement
//! - [`paging`]: FIFO and LRU page replacement
//!
//! Every engine is a pure function of its workload: each call works on its
//! own copy of the inputs, so runs of different algorithms over the same
//! workload are directly comparable.

pub mod allocation;
pub mod error;
pub mod generator;
pub mod paging;
pub mod report;
pub mod scheduling;
pub mod workload;

pub use error::{Result, WorkloadError};
