//! Status codes and last-error reporting.

use dtrack_core::CoreError;
use std::cell::RefCell;
use std::ffi::CString;

/// Status code returned by dtrack FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// The init config violates an invariant.
    InvalidConfig = 2,
    /// The engine already has an active session.
    AlreadyInitialized = 3,
    /// The event failed verification and was dropped.
    InvalidEvent = 4,
    /// The operation requires an initialized engine.
    NotReady = 5,
    /// Buffered records could not be written; nothing is retried.
    WriteFailure = 6,
    /// The target path cannot be opened for writing.
    StorageUnavailable = 7,
    /// A required pointer argument was null.
    NullPointer = 8,
    /// A string argument was not valid UTF-8.
    InvalidUtf8 = 9,
}

impl DtStatus {
    /// Returns true if the status indicates success.
    pub fn is_ok(self) -> bool {
        self == DtStatus::Ok
    }

    /// Returns true if the status indicates an error.
    pub fn is_err(self) -> bool {
        self != DtStatus::Ok
    }
}

impl From<&CoreError> for DtStatus {
    fn from(error: &CoreError) -> Self {
        match error {
            CoreError::InvalidConfig { .. } => DtStatus::InvalidConfig,
            CoreError::AlreadyInitialized => DtStatus::AlreadyInitialized,
            CoreError::NotReady => DtStatus::NotReady,
            CoreError::InvalidEvent { .. } | CoreError::EventTooLarge { .. } => {
                DtStatus::InvalidEvent
            }
            CoreError::WriteFailure { .. } => DtStatus::WriteFailure,
            CoreError::StorageUnavailable { .. } => DtStatus::StorageUnavailable,
        }
    }
}

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Sets the last error message for this thread.
pub(crate) fn set_last_error(message: impl Into<String>) {
    let msg = message.into();
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clears the last error for this thread.
pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Records the error and returns its status code.
pub(crate) fn fail(error: &CoreError) -> DtStatus {
    set_last_error(error.to_string());
    DtStatus::from(error)
}

/// Gets the last error message as a C string.
///
/// Returns null if no error is set.
///
/// # Safety
///
/// The returned pointer is valid until the next FFI call on this thread.
#[no_mangle]
pub extern "C" fn dt_last_error() -> *const std::ffi::c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => std::ptr::null(),
    })
}

/// Clears the last error message for the calling thread.
#[no_mangle]
pub extern "C" fn dt_clear_error() {
    clear_last_error();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(DtStatus::Ok as i32, 0);
        assert_eq!(DtStatus::InvalidConfig as i32, 2);
        assert_eq!(DtStatus::AlreadyInitialized as i32, 3);
        assert_eq!(DtStatus::NotReady as i32, 5);
        assert!(DtStatus::Ok.is_ok());
        assert!(DtStatus::WriteFailure.is_err());
    }

    #[test]
    fn core_errors_map_to_codes() {
        assert_eq!(
            DtStatus::from(&CoreError::AlreadyInitialized),
            DtStatus::AlreadyInitialized
        );
        assert_eq!(DtStatus::from(&CoreError::NotReady), DtStatus::NotReady);
        assert_eq!(
            DtStatus::from(&CoreError::invalid_event("bad")),
            DtStatus::InvalidEvent
        );
        assert_eq!(
            DtStatus::from(&CoreError::write_failure("disk full")),
            DtStatus::WriteFailure
        );
    }

    #[test]
    fn last_error_round_trip() {
        clear_last_error();
        assert!(dt_last_error().is_null());

        set_last_error("test error");
        let ptr = dt_last_error();
        assert!(!ptr.is_null());

        // Safety: we just set it
        let msg = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(msg.to_str().unwrap(), "test error");

        dt_clear_error();
        assert!(dt_last_error().is_null());
    }
}
