//! # Error Types
//!
//! Errors the streaming core surfaces to its host. Most failure modes inside the
//! lifecycle (stale task results, out-of-range voxel access, unloaded neighbours)
//! are recovered locally and never reach this type.

use thiserror::Error;

/// Fatal or configuration-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The graphics backend could not be initialized. Not retried.
    #[error("graphics backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A configuration value failed validation.
    #[error("invalid streaming configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file was not valid JSON for [`StreamingConfig`](crate::config::StreamingConfig).
    #[error("failed to parse streaming configuration")]
    ConfigParse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read streaming configuration")]
    Io(#[from] std::io::Error),

    /// A flat voxel buffer did not hold exactly `size³` type codes.
    #[error("voxel buffer holds {actual} entries, expected {expected}")]
    BufferSize {
        /// Number of entries a chunk of the configured size needs
        expected: usize,
        /// Number of entries actually supplied
        actual: usize,
    },
}
