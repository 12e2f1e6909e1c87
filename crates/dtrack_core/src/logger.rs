//! Process-wide switch for internal diagnostic logging.
//!
//! The switch gates the engine's own diagnostic lines, never user events.
//! Diagnostics are emitted as `tracing` events, so embedders decide where
//! they go by installing a subscriber.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enables or disables internal diagnostic logging.
///
/// May be called in any engine state; has no effect on event persistence.
pub fn set_enabled(enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns whether internal diagnostic logging is currently enabled.
pub fn enabled() -> bool {
    LOG_ENABLED.load(Ordering::Relaxed)
}

macro_rules! diag_debug {
    ($($arg:tt)*) => {
        if $crate::logger::enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

macro_rules! diag_info {
    ($($arg:tt)*) => {
        if $crate::logger::enabled() {
            tracing::info!($($arg)*);
        }
    };
}

macro_rules! diag_warn {
    ($($arg:tt)*) => {
        if $crate::logger::enabled() {
            tracing::warn!($($arg)*);
        }
    };
}

macro_rules! diag_error {
    ($($arg:tt)*) => {
        if $crate::logger::enabled() {
            tracing::error!($($arg)*);
        }
    };
}

pub(crate) use {diag_debug, diag_error, diag_info, diag_warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trip() {
        set_enabled(true);
        assert!(enabled());
        set_enabled(false);
        assert!(!enabled());
    }
}
