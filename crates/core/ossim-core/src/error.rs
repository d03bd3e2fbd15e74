//! Error types for ossim

use thiserror::Error;

use crate::types::{JobId, Partition};

/// Result type for configuration checks
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A workload or parameter set rejected before any simulation runs.
///
/// Values are never clamped or corrected; the caller gets the first problem
/// found and decides what to do with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Round-Robin quantum must be positive")]
    ZeroQuantum,

    #[error("Job ids must be positive integers")]
    ZeroJobId,

    #[error("Duplicate job id: {0}")]
    DuplicateJobId(JobId),

    #[error("Job {0} has a zero service time")]
    ZeroServiceTime(JobId),

    #[error("Workload of {jobs} jobs overflows the simulated clock")]
    TimeOverflow { jobs: usize },

    #[error("Partition starting at {start} has zero size")]
    ZeroSizedPartition { start: u64 },

    #[error("Partition starting at {start} with size {size} overflows the address space")]
    AddressOverflow { start: u64, size: u64 },

    #[error("Partitions {first} and {second} overlap")]
    OverlappingPartitions { first: Partition, second: Partition },

    #[error("Request {request_id} asks for zero units of memory")]
    ZeroSizedRequest { request_id: usize },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a free-form configuration error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
