//! Error types for the dtrack core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in dtrack core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Init parameters violate a config invariant. Fatal to that init
    /// call; the engine stays uninitialized.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of the violated invariant.
        message: String,
    },

    /// Init was called on an engine that already has an active session.
    #[error("engine is already initialized")]
    AlreadyInitialized,

    /// The operation requires a ready engine.
    #[error("engine is not ready: initialize it before API calls")]
    NotReady,

    /// The event is malformed. The event is dropped; the session
    /// continues.
    #[error("invalid event: {message}")]
    InvalidEvent {
        /// Description of what failed verification.
        message: String,
    },

    /// A single serialized event exceeds the log-file size cap, so no
    /// rotation could ever make it fit.
    #[error("event of {size} bytes cannot fit a log file capped at {max} bytes")]
    EventTooLarge {
        /// Encoded size of the record including its terminator.
        size: u64,
        /// The configured `max_file_size_bytes`.
        max: u64,
    },

    /// Writing buffered records to the log file failed. Drained records
    /// are not re-queued; the failure is reported, not retried.
    #[error("write failure: {message}")]
    WriteFailure {
        /// Description of the underlying I/O problem.
        message: String,
    },

    /// The target path cannot be opened for writing.
    #[error("storage unavailable at {path}: {message}")]
    StorageUnavailable {
        /// The log directory or file that could not be opened.
        path: String,
        /// Description of the underlying I/O problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an invalid event error.
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Creates a write failure error.
    pub fn write_failure(message: impl Into<String>) -> Self {
        Self::WriteFailure {
            message: message.into(),
        }
    }

    /// Creates a storage unavailable error.
    pub fn storage_unavailable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            message: message.into(),
        }
    }
}
