//! # dtrack Core
//!
//! Event pipeline engine for the dtrack analytics SDK.
//!
//! This crate provides:
//! - Event construction, verification, and canonical serialization
//! - The consumer-backend capability (append / flush / close)
//! - The batched, size-rotated log-file consumer
//! - The engine/session lifecycle coordinating the pipeline
//!
//! Callers construct track events; the engine stamps the reserved identity
//! and metadata keys, validates the record, and hands it to the active
//! consumer backend. The log-file consumer buffers records, flushes when
//! the batch threshold is reached, and rotates output files by size so a
//! downstream uploader can ship whole closed files.
//!
//! ```rust,no_run
//! use dtrack_core::{Config, Engine, EventType, Properties};
//!
//! let engine = Engine::new();
//! engine.init(Config::log("/tmp/dt").max_batch_len(20))?;
//! engine.add_event("dt-1", "", "login", EventType::Track, Properties::new())?;
//! engine.flush()?;
//! engine.close()?;
//! # Ok::<(), dtrack_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod consumer;
pub mod engine;
pub mod error;
pub mod event;
pub mod logger;

pub use config::{Config, ConsumerKind};
pub use engine::Engine;
pub use error::{CoreError, CoreResult};
pub use event::{EventType, Properties, SerializedEvent};
