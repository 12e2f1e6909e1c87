//! Append-only store trait definition.

use crate::error::StorageResult;

/// A low-level append-only byte store.
///
/// Stores are **opaque byte sinks**. The consumer backends in `dtrack_core`
/// own all record framing and rotation; a store never knows where one event
/// record ends and the next begins.
///
/// # Invariants
///
/// - `append` returns the offset where the data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `flush` pushes all appended bytes towards durable storage
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait AppendStore: Send + Sync {
    /// Appends data to the end of the store.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes.
    ///
    /// After this returns successfully, appended bytes have been handed to
    /// the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Syncs data and metadata to durable storage.
    ///
    /// This is a stronger guarantee than `flush` - it also makes the file
    /// size durable. Consumers call it before abandoning a rotated file.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the store in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;
}
