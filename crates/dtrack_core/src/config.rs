//! Consumer backend configuration.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Default batch threshold when the payload omits `max_batch_len`.
pub const DEFAULT_MAX_BATCH_LEN: u32 = 100;

/// Default file size cap when the payload omits `max_file_size_bytes`.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;

/// Default log-file name prefix.
pub const DEFAULT_NAME_PREFIX: &str = "dt";

/// Which consumer backend variant to construct at init time.
///
/// A closed set of variants selected from config, not an open class
/// hierarchy; new delivery backends are added here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ConsumerKind {
    /// Batched writer producing size-rotated local log files.
    Log,
}

/// Immutable description of a consumer backend.
///
/// Pure data: constructed by the caller (or deserialized from the init
/// payload), validated by [`crate::Engine::init`], and never mutated after
/// the engine is initialized.
///
/// The serde shape matches the wire payload consumed by the C ABI:
///
/// ```json
/// {"consumer":"log","path":"/tmp/dt","max_batch_len":100,
///  "name_prefix":"dt","max_file_size_bytes":2097152,"_debug":1}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The backend variant to construct.
    #[serde(rename = "consumer")]
    pub kind: ConsumerKind,

    /// Directory the log files are written into.
    pub path: PathBuf,

    /// Number of buffered records that triggers an internal flush.
    #[serde(default = "default_max_batch_len")]
    pub max_batch_len: u32,

    /// Log-file name prefix; files are named `{prefix}-{seq}.log`.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Size cap per log file; appending past it rotates to a new file.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Whether the session runs in debug mode. Foreign bindings send this
    /// as `_debug: 1`.
    #[serde(
        rename = "_debug",
        default,
        deserialize_with = "debug_flag",
        skip_serializing_if = "core::ops::Not::not"
    )]
    pub debug: bool,
}

impl Config {
    /// Creates a log-file backend config for the given directory, with
    /// default batch and rotation settings.
    pub fn log(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ConsumerKind::Log,
            path: path.into(),
            max_batch_len: DEFAULT_MAX_BATCH_LEN,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            debug: false,
        }
    }

    /// Sets the batch threshold.
    #[must_use]
    pub fn max_batch_len(mut self, len: u32) -> Self {
        self.max_batch_len = len;
        self
    }

    /// Sets the log-file name prefix.
    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the per-file size cap.
    #[must_use]
    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Sets debug mode.
    #[must_use]
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Checks the config invariants. Called at init time, not at
    /// construction.
    pub(crate) fn validate(&self) -> CoreResult<()> {
        if self.max_batch_len == 0 {
            return Err(CoreError::invalid_config(
                "max_batch_len must be greater than zero",
            ));
        }
        if self.max_file_size_bytes == 0 {
            return Err(CoreError::invalid_config(
                "max_file_size_bytes must be greater than zero",
            ));
        }
        if self.path.as_os_str().is_empty() {
            return Err(CoreError::invalid_config("path must not be empty"));
        }
        if self.name_prefix.is_empty() {
            return Err(CoreError::invalid_config("name_prefix must not be empty"));
        }
        Ok(())
    }
}

fn default_max_batch_len() -> u32 {
    DEFAULT_MAX_BATCH_LEN
}

fn default_name_prefix() -> String {
    DEFAULT_NAME_PREFIX.to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

/// Accepts `_debug` as a bool or as an integer (`1`/`0`), the way foreign
/// bindings send it.
fn debug_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Bool(flag) => Ok(flag),
        serde_json::Value::Number(num) => Ok(num.as_f64().is_some_and(|n| n != 0.0)),
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "_debug must be a bool or integer, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let config = Config::log("/tmp/dt")
            .max_batch_len(2)
            .name_prefix("t")
            .max_file_size_bytes(1_000_000);

        assert_eq!(config.kind, ConsumerKind::Log);
        assert_eq!(config.max_batch_len, 2);
        assert_eq!(config.name_prefix, "t");
        assert_eq!(config.max_file_size_bytes, 1_000_000);
        assert!(!config.debug);
    }

    #[test]
    fn wire_payload_round_trip() {
        let payload = r#"{
            "consumer": "log",
            "path": "/tmp/dt",
            "max_batch_len": 50,
            "name_prefix": "t",
            "max_file_size_bytes": 1000000,
            "_debug": 1
        }"#;

        let config: Config = serde_json::from_str(payload).unwrap();
        assert_eq!(config.kind, ConsumerKind::Log);
        assert_eq!(config.path, PathBuf::from("/tmp/dt"));
        assert_eq!(config.max_batch_len, 50);
        assert_eq!(config.name_prefix, "t");
        assert_eq!(config.max_file_size_bytes, 1_000_000);
        assert!(config.debug);
    }

    #[test]
    fn payload_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"consumer":"log","path":"/tmp/dt"}"#).unwrap();
        assert_eq!(config.max_batch_len, DEFAULT_MAX_BATCH_LEN);
        assert_eq!(config.name_prefix, DEFAULT_NAME_PREFIX);
        assert_eq!(config.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES);
        assert!(!config.debug);
    }

    #[test]
    fn debug_flag_accepts_bool_and_int() {
        let with_bool: Config =
            serde_json::from_str(r#"{"consumer":"log","path":"p","_debug":true}"#).unwrap();
        assert!(with_bool.debug);

        let with_zero: Config =
            serde_json::from_str(r#"{"consumer":"log","path":"p","_debug":0}"#).unwrap();
        assert!(!with_zero.debug);
    }

    #[test]
    fn unknown_consumer_kind_is_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"consumer":"udp","path":"p"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_zero_batch_len() {
        let config = Config::log("/tmp/dt").max_batch_len(0);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_path() {
        let config = Config::log("");
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));
    }
}
