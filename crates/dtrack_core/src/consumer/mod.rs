//! Consumer backends: durable delivery of serialized event records.

pub mod log;

pub use log::LogConsumer;

use crate::config::{Config, ConsumerKind};
use crate::error::{CoreError, CoreResult};
use crate::event::SerializedEvent;

/// A pluggable delivery backend for serialized events.
///
/// Backends buffer appended records and decide when and where they become
/// durable. All three operations serialize through the backend's internal
/// lock: an append that triggers a flush blocks concurrent appends until
/// the flush completes, and no two appends interleave mid-record.
pub trait Consumer: Send + Sync {
    /// Adds a record to the in-memory batch.
    ///
    /// Reaching the batch threshold triggers a synchronous flush of
    /// exactly the records appended so far.
    ///
    /// # Errors
    ///
    /// A storage failure during that induced flush is reported as
    /// [`CoreError::WriteFailure`]; the record still counts as delivered
    /// to the backend and is not re-queued.
    fn append(&self, record: SerializedEvent) -> CoreResult<()>;

    /// Forces all buffered records to storage, regardless of the batch
    /// threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StorageUnavailable`] when the target cannot be
    /// opened and [`CoreError::WriteFailure`] when writing fails.
    fn flush(&self) -> CoreResult<()>;

    /// Flushes any remaining buffer, then releases the backend's
    /// resources. Idempotent: a second call is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns the final flush error, if any; resources are released
    /// either way.
    fn close(&self) -> CoreResult<()>;
}

/// Constructs the backend variant selected by the config.
///
/// Validates the config first: this is the init-time validation point,
/// config construction itself never fails.
///
/// # Errors
///
/// Returns [`CoreError::InvalidConfig`] when a config invariant is
/// violated, including a target path that is not a usable directory.
pub fn from_config(config: &Config) -> CoreResult<Box<dyn Consumer>> {
    config.validate()?;
    match config.kind {
        ConsumerKind::Log => match LogConsumer::open(config) {
            Ok(consumer) => Ok(Box::new(consumer)),
            // At init time an unopenable path is a config problem.
            Err(CoreError::StorageUnavailable { path, message }) => Err(CoreError::invalid_config(
                format!("path is not a usable directory ({path}): {message}"),
            )),
            Err(other) => Err(other),
        },
    }
}
