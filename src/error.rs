//! Error types for checkpoint serialization

use std::io;

use thiserror::Error;

/// Errors that can occur while saving or loading a checkpoint
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Filesystem operation failed
    #[error("i/o failure at '{path}': {source}")]
    Io {
        /// Path of the file or directory involved
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Checkpoint file ended before the block sequence was satisfied
    #[error(
        "checkpoint file '{path}' truncated at block {block_index} ({expected} bytes still expected)"
    )]
    TruncatedFile {
        /// Path of the checkpoint file
        path: String,
        /// Index of the block whose read could not be completed
        block_index: usize,
        /// Bytes the block still required
        expected: usize,
    },

    /// Invalid configuration parameter
    #[error("invalid configuration: {parameter} - {reason}")]
    InvalidConfiguration {
        /// Name of the invalid configuration parameter
        parameter: String,
        /// Why the parameter is invalid
        reason: String,
    },
}

impl CheckpointError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        CheckpointError::Io {
            path: crate::paths::posix_path(path),
            source,
        }
    }
}

/// Result type alias for checkpoint operations
pub type Result<T> = core::result::Result<T, CheckpointError>;
