//! Error types for workload loading

use ossim_core::ConfigError;
use thiserror::Error;

/// Workload loading result type
pub type Result<T> = std::result::Result<T, WorkloadError>;

/// Errors raised while turning files or text into workloads
#[derive(Error, Debug)]
pub enum WorkloadError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed plain-text workload
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Workload parsed but failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorkloadError {
    /// Create a parse error for a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
