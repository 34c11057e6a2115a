//! # Sort Error Types
//!
//! All errors that can occur while configuring or running a sort.

use thiserror::Error;

/// Errors that can occur in the sort pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// Missing or unparseable command line arguments.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// Parameters that cannot produce a valid partition layout.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The OS refused to create a worker thread.
    #[error("failed to spawn worker {worker}: {reason}")]
    ThreadCreationFailure {
        /// Index of the worker that could not be spawned.
        worker: usize,
        /// OS error text.
        reason: String,
    },

    /// A worker thread panicked before reporting.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// A farm channel disconnected while the run was still in progress.
    #[error("farm channel closed before termination")]
    ChannelClosed,

    /// The sort did not converge within the round ceiling.
    #[error("no convergence after {rounds} rounds (ceiling {ceiling})")]
    AlgorithmInvariantViolation {
        /// Rounds executed when the ceiling was hit.
        rounds: u64,
        /// The configured ceiling.
        ceiling: u64,
    },
}

/// Result type for sort operations.
pub type SortResult<T> = Result<T, SortError>;
