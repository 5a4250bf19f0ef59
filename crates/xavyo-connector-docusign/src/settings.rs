//! Settings normalization.
//!
//! Turns a typed settings record into a flat `fieldName -> value` map by one
//! JSON round trip. Only top-level keys are produced; nested objects stay
//! nested.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{DocusignError, DocusignResult};

/// `fieldName -> value` view of a settings record.
pub type NormalizedSettings = Map<String, Value>;

/// Normalize any serializable settings record.
///
/// Fails with [`DocusignError::SettingsDecode`] if serialization fails or the
/// record does not serialize to a JSON object.
pub fn normalize<T: Serialize + ?Sized>(settings: &T) -> DocusignResult<NormalizedSettings> {
    let value = serde_json::to_value(settings)
        .map_err(|e| DocusignError::SettingsDecode(format!("failed to serialize settings: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(DocusignError::SettingsDecode(format!(
            "settings must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSettings;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_typed_settings_keep_every_present_key() {
        let settings: UserSettings = serde_json::from_value(json!({
            "canManageAccount": "true",
            "enableVaulting": true,
            "signerEmailNotifications": {"envelopeComplete": "true"},
            "customFlag": "x"
        }))
        .unwrap();

        let normalized = normalize(&settings).unwrap();

        assert_eq!(normalized.len(), 4);
        assert_eq!(normalized["canManageAccount"], json!("true"));
        assert_eq!(normalized["enableVaulting"], json!(true));
        assert_eq!(normalized["customFlag"], json!("x"));
        // Nested objects are not flattened.
        assert!(normalized["signerEmailNotifications"].is_object());
        assert!(!normalized.contains_key("envelopeComplete"));
    }

    #[test]
    fn test_map_input() {
        let mut map = BTreeMap::new();
        map.insert("adminOnly", "Admin");
        let normalized = normalize(&map).unwrap();
        assert_eq!(normalized["adminOnly"], json!("Admin"));
    }

    #[test]
    fn test_non_object_fails() {
        let none: Option<UserSettings> = None;
        assert!(matches!(
            normalize(&none),
            Err(DocusignError::SettingsDecode(_))
        ));
        assert!(matches!(
            normalize(&vec![1, 2, 3]),
            Err(DocusignError::SettingsDecode(_))
        ));
    }

    #[test]
    fn test_serialization_failure_fails() {
        // Maps with non-string keys cannot become JSON objects.
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "x");
        assert!(matches!(
            normalize(&map),
            Err(DocusignError::SettingsDecode(_))
        ));
    }
}
