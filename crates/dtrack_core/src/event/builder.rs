//! Event construction: reserved-key stamping and canonical serialization.

use crate::error::{CoreError, CoreResult};
use crate::event::{
    verify, EventType, Properties, SerializedEvent, KEY_ACID, KEY_DT_ID, KEY_EVENT_NAME,
    KEY_EVENT_TYPE, KEY_SDK_TYPE, SDK_TYPE,
};
use serde_json::Value;

/// Builds a serialized record from identity fields and caller properties.
///
/// The caller's property map is taken over and the five reserved keys are
/// stamped on top of it - a caller-supplied value under a reserved name is
/// overwritten, last write wins. The stamped record is verified and
/// serialized to canonical JSON (sorted keys).
///
/// # Errors
///
/// Returns [`CoreError::InvalidEvent`] when `event_name` is empty or not
/// name-shaped, when a property name is invalid, or when a property value
/// is not a string, number, boolean, or list of strings.
pub fn build(
    dt_id: &str,
    acid: &str,
    event_name: &str,
    event_type: EventType,
    properties: Properties,
) -> CoreResult<SerializedEvent> {
    let mut record = properties;
    record.insert(KEY_DT_ID.to_string(), Value::String(dt_id.to_string()));
    record.insert(KEY_ACID.to_string(), Value::String(acid.to_string()));
    record.insert(
        KEY_EVENT_NAME.to_string(),
        Value::String(event_name.to_string()),
    );
    record.insert(
        KEY_EVENT_TYPE.to_string(),
        Value::String(event_type.as_str().to_string()),
    );
    record.insert(KEY_SDK_TYPE.to_string(), Value::String(SDK_TYPE.to_string()));

    serialize(record)
}

/// Verifies and serializes a record that already carries the reserved
/// keys - the path taken by foreign bindings, which stamp identity fields
/// on their side of the boundary.
///
/// # Errors
///
/// Returns [`CoreError::InvalidEvent`] when verification or serialization
/// fails.
pub fn serialize(record: Properties) -> CoreResult<SerializedEvent> {
    verify::verify_record(&record)?;
    match serde_json::to_string(&record) {
        Ok(json) => Ok(SerializedEvent::from_json_string(json)),
        Err(e) => Err(CoreError::invalid_event(format!(
            "failed to serialize event: {e}"
        ))),
    }
}
