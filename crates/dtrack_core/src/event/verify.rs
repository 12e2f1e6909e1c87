//! Record verification: reserved-key checks and property constraints.

use crate::error::{CoreError, CoreResult};
use crate::event::{
    EventType, Properties, KEY_ACID, KEY_DT_ID, KEY_EVENT_NAME, KEY_EVENT_TYPE, KEY_SDK_TYPE,
    RESERVED_KEYS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Event and property names: a letter, `#`, or `$`, followed by up to 63
/// word characters.
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[#$a-zA-Z][a-zA-Z0-9_]{0,63}$").expect("name pattern is valid"));

/// Verifies a fully stamped record before serialization.
///
/// Checks that the reserved keys are present with the right shapes and
/// that every caller-supplied property has a valid name and a supported
/// value type.
pub(crate) fn verify_record(record: &Properties) -> CoreResult<()> {
    // #dt_id must be present and a string; it may be empty.
    require_string(record, KEY_DT_ID)?;

    if let Some(acid) = record.get(KEY_ACID) {
        if !acid.is_string() {
            return Err(CoreError::invalid_event(format!(
                "{KEY_ACID} must be a string"
            )));
        }
    }

    let event_name = require_string(record, KEY_EVENT_NAME)?;
    if event_name.is_empty() {
        return Err(CoreError::invalid_event(format!(
            "{KEY_EVENT_NAME} must not be empty"
        )));
    }
    if !NAME_RE.is_match(event_name) {
        return Err(CoreError::invalid_event(format!(
            "{KEY_EVENT_NAME} (\"{event_name}\") is not a valid name"
        )));
    }

    let event_type = require_string(record, KEY_EVENT_TYPE)?;
    if EventType::from_wire(event_type).is_none() {
        return Err(CoreError::invalid_event(format!(
            "{KEY_EVENT_TYPE} (\"{event_type}\") is not a known event kind"
        )));
    }

    require_string(record, KEY_SDK_TYPE)?;

    for (key, value) in record {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !NAME_RE.is_match(key) {
            return Err(CoreError::invalid_event(format!(
                "property name (\"{key}\") is invalid"
            )));
        }
        verify_value(key, value)?;
    }

    Ok(())
}

fn require_string<'a>(record: &'a Properties, key: &str) -> CoreResult<&'a str> {
    match record.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(CoreError::invalid_event(format!("{key} must be a string"))),
        None => Err(CoreError::invalid_event(format!(
            "{key} is required, but missing"
        ))),
    }
}

/// Property values are limited to string, number, boolean, or
/// list-of-string.
fn verify_value(key: &str, value: &Value) -> CoreResult<()> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        Value::Array(items) => {
            if items.iter().all(Value::is_string) {
                Ok(())
            } else {
                Err(CoreError::invalid_event(format!(
                    "property \"{key}\": lists may only contain strings"
                )))
            }
        }
        other => Err(CoreError::invalid_event(format!(
            "property \"{key}\" has unsupported value {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stamped(name: &str) -> Properties {
        let Value::Object(map) = json!({
            "#dt_id": "u1",
            "#acid": "",
            "#event_name": name,
            "#event_type": "track",
            "#sdk_type": "dt_server_sdk_rust",
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn accepts_minimal_record() {
        assert!(verify_record(&stamped("login")).is_ok());
    }

    #[test]
    fn rejects_empty_event_name() {
        let result = verify_record(&stamped(""));
        assert!(matches!(result, Err(CoreError::InvalidEvent { .. })));
    }

    #[test]
    fn rejects_name_starting_with_digit() {
        let result = verify_record(&stamped("1login"));
        assert!(matches!(result, Err(CoreError::InvalidEvent { .. })));
    }

    #[test]
    fn accepts_preset_style_names() {
        assert!(verify_record(&stamped("#session_start")).is_ok());
        assert!(verify_record(&stamped("$app_install")).is_ok());
    }

    #[test]
    fn rejects_missing_dt_id() {
        let mut record = stamped("login");
        record.remove(KEY_DT_ID);
        assert!(matches!(
            verify_record(&record),
            Err(CoreError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn empty_dt_id_is_allowed() {
        let mut record = stamped("login");
        record.insert(KEY_DT_ID.to_string(), json!(""));
        assert!(verify_record(&record).is_ok());
    }

    #[test]
    fn rejects_unknown_event_type() {
        let mut record = stamped("login");
        record.insert(KEY_EVENT_TYPE.to_string(), json!("upload"));
        assert!(matches!(
            verify_record(&record),
            Err(CoreError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn accepts_supported_property_values() {
        let mut record = stamped("login");
        record.insert("level".to_string(), json!(42));
        record.insert("ratio".to_string(), json!(0.5));
        record.insert("channel".to_string(), json!("organic"));
        record.insert("first_time".to_string(), json!(true));
        record.insert("tags".to_string(), json!(["a", "b"]));
        assert!(verify_record(&record).is_ok());
    }

    #[test]
    fn rejects_nested_object_value() {
        let mut record = stamped("login");
        record.insert("nested".to_string(), json!({"a": 1}));
        assert!(matches!(
            verify_record(&record),
            Err(CoreError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn rejects_mixed_list_value() {
        let mut record = stamped("login");
        record.insert("tags".to_string(), json!(["a", 1]));
        assert!(matches!(
            verify_record(&record),
            Err(CoreError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn rejects_invalid_property_name() {
        let mut record = stamped("login");
        record.insert("bad name".to_string(), json!("x"));
        assert!(matches!(
            verify_record(&record),
            Err(CoreError::InvalidEvent { .. })
        ));
    }
}
