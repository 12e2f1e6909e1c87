//! C ABI functions over the process-wide engine.

use crate::error::{clear_last_error, fail, set_last_error, DtStatus};
use dtrack_core::{logger, Engine, Properties};
use std::ffi::{c_char, CStr};
use std::sync::Once;

/// The one engine behind the C ABI. Foreign processes get exactly one
/// session per process lifetime.
static ENGINE: Engine = Engine::new();

static SUBSCRIBER: Once = Once::new();

/// C callers have no way to install a tracing subscriber, so the first
/// logger enable installs a default one. `DTRACK_LOG` overrides the
/// filter.
fn ensure_subscriber() {
    SUBSCRIBER.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_env("DTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// Initializes the process-wide engine from a JSON config payload:
///
/// ```json
/// {"consumer":"log","path":"/tmp/dt","max_batch_len":100,
///  "name_prefix":"dt","max_file_size_bytes":2097152,"_debug":1}
/// ```
///
/// # Safety
///
/// `raw_config` must be a valid null-terminated UTF-8 string or null.
#[no_mangle]
pub unsafe extern "C" fn dt_init(raw_config: *const c_char) -> DtStatus {
    clear_last_error();

    let payload = match cstr_arg(raw_config) {
        Ok(payload) => payload,
        Err(status) => return status,
    };

    match ENGINE.init_from_json(payload) {
        Ok(()) => DtStatus::Ok,
        Err(e) => fail(&e),
    }
}

/// Adds a complete event record: JSON carrying the reserved keys the
/// foreign wrapper stamped (`#dt_id`, `#acid`, `#event_name`,
/// `#event_type`, `#sdk_type`) plus caller properties.
///
/// # Safety
///
/// `raw_event` must be a valid null-terminated UTF-8 string or null.
#[no_mangle]
pub unsafe extern "C" fn dt_add_event(raw_event: *const c_char) -> DtStatus {
    clear_last_error();

    let payload = match cstr_arg(raw_event) {
        Ok(payload) => payload,
        Err(status) => return status,
    };

    add_event_payload(payload)
}

/// Adds a complete event record from a UTF-8 buffer with an explicit
/// length, for embedders that cannot guarantee null termination.
///
/// # Safety
///
/// `utf8_str` must point to at least `len` readable bytes, or be null.
#[no_mangle]
pub unsafe extern "C" fn dt_add_event_bytes(utf8_str: *const u8, len: i32) -> DtStatus {
    clear_last_error();

    if utf8_str.is_null() {
        set_last_error("null event pointer");
        return DtStatus::NullPointer;
    }
    let Ok(len) = usize::try_from(len) else {
        set_last_error(format!("negative event length: {len}"));
        return DtStatus::Error;
    };

    let bytes = std::slice::from_raw_parts(utf8_str, len);
    let payload = match std::str::from_utf8(bytes) {
        Ok(payload) => payload,
        Err(e) => {
            set_last_error(format!("event is not valid UTF-8: {e}"));
            return DtStatus::InvalidUtf8;
        }
    };

    add_event_payload(payload)
}

/// Forces all buffered records to storage. Fire-and-forget at this
/// boundary: failures are recorded in the last error and the diagnostic
/// log, never surfaced synchronously.
#[no_mangle]
pub extern "C" fn dt_flush() {
    if let Err(e) = ENGINE.flush() {
        set_last_error(e.to_string());
        if logger::enabled() {
            tracing::error!("flush failed: {e}");
        }
    }
}

/// Flushes and releases all engine resources. Safe to call multiple
/// times.
#[no_mangle]
pub extern "C" fn dt_close() {
    if let Err(e) = ENGINE.close() {
        set_last_error(e.to_string());
        if logger::enabled() {
            tracing::error!("close failed: {e}");
        }
    }
}

/// Enables or disables the engine's internal diagnostic logging.
#[no_mangle]
pub extern "C" fn dt_toggle_logger(enable: u8) {
    if enable != 0 {
        ensure_subscriber();
    }
    ENGINE.set_logging(enable != 0);
}

fn add_event_payload(payload: &str) -> DtStatus {
    let record: Properties = match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            set_last_error(format!("event must be a JSON object, got {other}"));
            return DtStatus::InvalidEvent;
        }
        Err(e) => {
            set_last_error(format!("failed to parse event: {e}"));
            return DtStatus::InvalidEvent;
        }
    };

    match ENGINE.add_record(record) {
        Ok(()) => DtStatus::Ok,
        Err(e) => fail(&e),
    }
}

/// Borrows a UTF-8 string argument, reporting null and encoding problems.
unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Result<&'a str, DtStatus> {
    if ptr.is_null() {
        set_last_error("null string argument");
        return Err(DtStatus::NullPointer);
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(value) => Ok(value),
        Err(e) => {
            set_last_error(format!("argument is not valid UTF-8: {e}"));
            Err(DtStatus::InvalidUtf8)
        }
    }
}
