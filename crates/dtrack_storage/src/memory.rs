//! In-memory store for testing.

use crate::error::{StorageError, StorageResult};
use crate::store::AppendStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory append store.
///
/// The underlying buffer is shared: cloning a `MemoryStore` yields a second
/// handle onto the same bytes. Tests hand one handle to a consumer and keep
/// the other to inspect what was written, including after a rotation has
/// moved the consumer on to another store.
///
/// # Example
///
/// ```rust
/// use dtrack_storage::{AppendStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// let inspector = store.clone();
/// store.append(b"record\n").unwrap();
/// assert_eq!(inspector.data(), b"record\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all bytes in the store.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl AppendStore for MemoryStore {
    fn append(&mut self, new_data: &[u8]) -> StorageResult<u64> {
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        // No pending writes in memory.
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // No metadata to sync in memory.
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let start = offset as usize;
        let end = start.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[start..end].to_vec())
    }
}
