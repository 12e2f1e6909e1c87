//! # dtrack Storage
//!
//! Append-only byte stores for the dtrack event pipeline.
//!
//! This crate provides the lowest-level storage abstraction for dtrack.
//! Stores are **opaque byte sinks** - they do not interpret the records
//! written through them. Batching, record framing, and file rotation all
//! live one layer up, in the consumer backends of `dtrack_core`.
//!
//! ## Design Principles
//!
//! - Stores only append, flush, and read back bytes
//! - No knowledge of events, batches, or rotation sequences
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral buffering
//! - [`FileStore`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use dtrack_storage::{AppendStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! let offset = store.append(b"{\"#event_name\":\"login\"}\n").unwrap();
//! assert_eq!(offset, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::AppendStore;
