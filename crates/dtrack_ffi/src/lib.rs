//! # dtrack FFI
//!
//! Stable C ABI for dtrack SDK bindings (C++, C#, Go, Java, Node, Python).
//!
//! This crate provides:
//! - C-compatible function exports over one process-wide engine
//! - Status-code mapping for every core error kind
//! - Thread-local last-error messages
//!
//! Foreign wrappers stamp the reserved identity keys on their side of the
//! boundary and hand complete JSON records to [`dt_add_event`] or
//! [`dt_add_event_bytes`]; the engine verifies and persists them.

mod api;
mod error;

pub use api::{
    dt_add_event, dt_add_event_bytes, dt_close, dt_flush, dt_init, dt_toggle_logger,
};
pub use error::{dt_clear_error, dt_last_error, DtStatus};
