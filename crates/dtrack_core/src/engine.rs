//! Engine/session lifecycle coordinating the event pipeline.

use crate::config::Config;
use crate::consumer::{self, Consumer};
use crate::error::{CoreError, CoreResult};
use crate::event::{builder, EventType, Properties};
use crate::logger::{self, diag_info};
use parking_lot::RwLock;

enum State {
    Uninitialized,
    Ready(Box<dyn Consumer>),
    Closed,
}

/// Coordinates the pipeline: one active consumer backend behind a
/// `Uninitialized -> Ready -> Closed` lifecycle.
///
/// An `Engine` is explicit process-scoped state, not a hidden global:
/// embedders (and tests) create as many independent engines as they need,
/// while the C ABI in `dtrack_ffi` owns the one process-wide instance.
///
/// `add_event` and `flush` run under a shared lock so they proceed
/// concurrently, serialized only by the consumer's own critical section;
/// `init` and `close` take the lock exclusively, so no operation overlaps
/// a lifecycle transition.
pub struct Engine {
    state: RwLock<State>,
}

impl Engine {
    /// Creates an engine in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(State::Uninitialized),
        }
    }

    /// Validates the config, constructs its consumer backend, and
    /// transitions to `Ready`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::AlreadyInitialized`] when a session is already
    ///   active (the previous session continues) or was closed
    /// - [`CoreError::InvalidConfig`] when the config violates an
    ///   invariant; the engine stays `Uninitialized`
    pub fn init(&self, config: Config) -> CoreResult<()> {
        let mut state = self.state.write();
        if !matches!(*state, State::Uninitialized) {
            return Err(CoreError::AlreadyInitialized);
        }

        if config.debug {
            logger::set_enabled(true);
        }

        let backend = consumer::from_config(&config)?;
        *state = State::Ready(backend);
        diag_info!("engine initialized with {:?} consumer", config.kind);
        Ok(())
    }

    /// Initializes from the wire config payload consumed at the C ABI.
    ///
    /// # Errors
    ///
    /// Malformed JSON surfaces as [`CoreError::InvalidConfig`]; otherwise
    /// as [`Engine::init`].
    pub fn init_from_json(&self, payload: &str) -> CoreResult<()> {
        let config: Config = serde_json::from_str(payload)
            .map_err(|e| CoreError::invalid_config(format!("bad config payload: {e}")))?;
        self.init(config)
    }

    /// Builds a track event and delegates it to the consumer backend.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotReady`] outside the `Ready` state
    /// - [`CoreError::InvalidEvent`] when the builder rejects the event;
    ///   the event is dropped, the session continues
    /// - [`CoreError::WriteFailure`] when a threshold-induced flush fails;
    ///   non-fatal, the event may not have been durably persisted
    pub fn add_event(
        &self,
        dt_id: &str,
        acid: &str,
        event_name: &str,
        event_type: EventType,
        properties: Properties,
    ) -> CoreResult<()> {
        let state = self.state.read();
        let State::Ready(backend) = &*state else {
            return Err(CoreError::NotReady);
        };

        let record = builder::build(dt_id, acid, event_name, event_type, properties)?;
        backend.append(record)
    }

    /// Verifies and delegates a record that already carries the reserved
    /// keys - the path taken by foreign bindings.
    ///
    /// # Errors
    ///
    /// As [`Engine::add_event`].
    pub fn add_record(&self, record: Properties) -> CoreResult<()> {
        let state = self.state.read();
        let State::Ready(backend) = &*state else {
            return Err(CoreError::NotReady);
        };

        let record = builder::serialize(record)?;
        backend.append(record)
    }

    /// Forces the consumer backend to write all buffered records.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotReady`] outside the `Ready` state; otherwise the
    /// backend's flush result.
    pub fn flush(&self) -> CoreResult<()> {
        let state = self.state.read();
        let State::Ready(backend) = &*state else {
            return Err(CoreError::NotReady);
        };
        backend.flush()
    }

    /// Closes the consumer backend and transitions to `Closed`.
    ///
    /// Idempotent: closing an already-closed engine is a no-op success.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotReady`] when the engine was never initialized;
    /// otherwise the backend's close result.
    pub fn close(&self) -> CoreResult<()> {
        let mut state = self.state.write();
        match std::mem::replace(&mut *state, State::Closed) {
            State::Ready(backend) => {
                let result = backend.close();
                diag_info!("engine closed");
                result
            }
            State::Closed => Ok(()),
            State::Uninitialized => {
                *state = State::Uninitialized;
                Err(CoreError::NotReady)
            }
        }
    }

    /// Enables or disables the engine's internal diagnostic logging.
    ///
    /// May be called in any state; has no effect on event persistence.
    pub fn set_logging(&self, enabled: bool) {
        logger::set_enabled(enabled);
    }

    /// Whether internal diagnostic logging is currently enabled.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        logger::enabled()
    }

    /// Whether a session is currently active.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), State::Ready(_))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SerializedEvent;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Records appended events for inspection.
    #[derive(Default)]
    struct RecordingConsumer {
        records: Arc<Mutex<Vec<String>>>,
        flushes: Arc<Mutex<u32>>,
    }

    impl Consumer for RecordingConsumer {
        fn append(&self, record: SerializedEvent) -> CoreResult<()> {
            self.records.lock().push(record.into_string());
            Ok(())
        }

        fn flush(&self) -> CoreResult<()> {
            *self.flushes.lock() += 1;
            Ok(())
        }

        fn close(&self) -> CoreResult<()> {
            Ok(())
        }
    }

    /// Fails every append, standing in for a dead disk behind the batch.
    struct FailingConsumer;

    impl Consumer for FailingConsumer {
        fn append(&self, _record: SerializedEvent) -> CoreResult<()> {
            Err(CoreError::write_failure("disk full"))
        }

        fn flush(&self) -> CoreResult<()> {
            Err(CoreError::write_failure("disk full"))
        }

        fn close(&self) -> CoreResult<()> {
            Ok(())
        }
    }

    fn ready_engine(backend: Box<dyn Consumer>) -> Engine {
        let engine = Engine::new();
        *engine.state.write() = State::Ready(backend);
        engine
    }

    #[test]
    fn add_event_before_init_is_not_ready() {
        let engine = Engine::new();
        let result = engine.add_event("u1", "", "login", EventType::Track, Properties::new());
        assert!(matches!(result, Err(CoreError::NotReady)));
    }

    #[test]
    fn flush_before_init_is_not_ready() {
        let engine = Engine::new();
        assert!(matches!(engine.flush(), Err(CoreError::NotReady)));
    }

    #[test]
    fn close_before_init_is_not_ready() {
        let engine = Engine::new();
        assert!(matches!(engine.close(), Err(CoreError::NotReady)));
        // The engine stays uninitialized and can still be initialized.
        assert!(!engine.is_ready());
    }

    #[test]
    fn init_twice_is_rejected() {
        let dir = tempdir().unwrap();
        let engine = Engine::new();
        engine.init(Config::log(dir.path())).unwrap();

        let result = engine.init(Config::log(dir.path()));
        assert!(matches!(result, Err(CoreError::AlreadyInitialized)));
        // The first session continues.
        assert!(engine.is_ready());
    }

    #[test]
    fn init_with_invalid_config_stays_uninitialized() {
        let engine = Engine::new();
        let result = engine.init(Config::log("/tmp/dt").max_batch_len(0));
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
        assert!(!engine.is_ready());

        // A corrected config can still initialize this engine.
        let dir = tempdir().unwrap();
        engine.init(Config::log(dir.path())).unwrap();
        assert!(engine.is_ready());
    }

    #[test]
    fn init_after_close_is_rejected() {
        let dir = tempdir().unwrap();
        let engine = Engine::new();
        engine.init(Config::log(dir.path())).unwrap();
        engine.close().unwrap();

        let result = engine.init(Config::log(dir.path()));
        assert!(matches!(result, Err(CoreError::AlreadyInitialized)));
    }

    #[test]
    fn add_event_delegates_built_record() {
        let backend = RecordingConsumer::default();
        let records = Arc::clone(&backend.records);
        let engine = ready_engine(Box::new(backend));

        engine
            .add_event("u1", "", "login", EventType::Track, Properties::new())
            .unwrap();

        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("\"#event_name\":\"login\""));
        assert!(records[0].contains("\"#sdk_type\""));
    }

    #[test]
    fn invalid_event_is_dropped_session_continues() {
        let backend = RecordingConsumer::default();
        let records = Arc::clone(&backend.records);
        let engine = ready_engine(Box::new(backend));

        let result = engine.add_event("u1", "", "", EventType::Track, Properties::new());
        assert!(matches!(result, Err(CoreError::InvalidEvent { .. })));
        assert!(records.lock().is_empty());

        // The next valid event still goes through.
        engine
            .add_event("u1", "", "login", EventType::Track, Properties::new())
            .unwrap();
        assert_eq!(records.lock().len(), 1);
    }

    #[test]
    fn write_failure_propagates_non_fatally() {
        let engine = ready_engine(Box::new(FailingConsumer));

        let result = engine.add_event("u1", "", "login", EventType::Track, Properties::new());
        assert!(matches!(result, Err(CoreError::WriteFailure { .. })));
        // The session is still ready after a reported write failure.
        assert!(engine.is_ready());
    }

    #[test]
    fn flush_delegates_to_backend() {
        let backend = RecordingConsumer::default();
        let flushes = Arc::clone(&backend.flushes);
        let engine = ready_engine(Box::new(backend));

        engine.flush().unwrap();
        assert_eq!(*flushes.lock(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let engine = ready_engine(Box::new(RecordingConsumer::default()));

        engine.close().unwrap();
        engine.close().unwrap();

        let result = engine.add_event("u1", "", "login", EventType::Track, Properties::new());
        assert!(matches!(result, Err(CoreError::NotReady)));
    }

    #[test]
    fn init_from_json_payload() {
        let dir = tempdir().unwrap();
        let payload = format!(
            r#"{{"consumer":"log","path":{},"max_batch_len":2,"name_prefix":"t","max_file_size_bytes":1000000}}"#,
            serde_json::to_string(dir.path()).unwrap()
        );

        let engine = Engine::new();
        engine.init_from_json(&payload).unwrap();
        assert!(engine.is_ready());
    }

    #[test]
    fn init_from_bad_json_is_invalid_config() {
        let engine = Engine::new();
        let result = engine.init_from_json("{not json");
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }
}
