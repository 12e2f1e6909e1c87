//! Event model: property maps, reserved keys, and serialized records.

pub mod builder;
pub(crate) mod verify;

use std::fmt;

/// Caller-supplied event properties.
///
/// Keys map to one of: string, number, boolean, or list-of-string.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Distinct-user identity, stamped by the engine.
pub const KEY_DT_ID: &str = "#dt_id";
/// Account identity, stamped by the engine; may be empty.
pub const KEY_ACID: &str = "#acid";
/// Event name, stamped by the engine; must be non-empty.
pub const KEY_EVENT_NAME: &str = "#event_name";
/// Event kind, stamped by the engine.
pub const KEY_EVENT_TYPE: &str = "#event_type";
/// Fixed SDK identifier, stamped by the engine.
pub const KEY_SDK_TYPE: &str = "#sdk_type";

/// The fixed value written under [`KEY_SDK_TYPE`].
pub const SDK_TYPE: &str = "dt_server_sdk_rust";

/// The keys the engine stamps on every record. Caller-supplied values
/// under these names are overwritten.
pub const RESERVED_KEYS: [&str; 5] = [
    KEY_DT_ID,
    KEY_ACID,
    KEY_EVENT_NAME,
    KEY_EVENT_TYPE,
    KEY_SDK_TYPE,
];

/// The kind of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventType {
    /// A user/system occurrence submitted for tracking.
    Track,
}

impl EventType {
    /// The wire string written under [`KEY_EVENT_TYPE`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Track => "track",
        }
    }

    /// Parses a wire string back into an event type.
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "track" => Some(EventType::Track),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified, canonically serialized event record.
///
/// Self-contained UTF-8 JSON; the consumer backend appends it to a log
/// file followed by a newline terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvent {
    json: String,
}

impl SerializedEvent {
    pub(crate) fn from_json_string(json: String) -> Self {
        Self { json }
    }

    /// The record as a JSON string, without the newline terminator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// The record bytes, without the newline terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.json.as_bytes()
    }

    /// The number of bytes this record occupies in a log file, including
    /// the newline terminator.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.json.len() as u64 + 1
    }

    /// Consumes the record, returning the JSON string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.json
    }
}

impl fmt::Display for SerializedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_wire_strings() {
        assert_eq!(EventType::Track.as_str(), "track");
        assert_eq!(EventType::from_wire("track"), Some(EventType::Track));
        assert_eq!(EventType::from_wire("user"), None);
    }

    #[test]
    fn encoded_len_counts_terminator() {
        let record = SerializedEvent::from_json_string("{}".to_string());
        assert_eq!(record.encoded_len(), 3);
        assert_eq!(record.as_bytes(), b"{}");
    }
}
