//! Warning records attached to a step execution

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used when an item field cannot be determined
pub const UNKNOWN_FIELD: &str = "[unknown]";

/// The data being processed when a warning occurred
///
/// Decided at capture time: an item that serializes to a JSON object is
/// preserved verbatim, anything else degrades to an opaque snapshot. This
/// replaces runtime type inspection with a closed variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WarningItem {
    /// A plain mapping, kept as-is
    Structured(Map<String, Value>),
    /// A non-mapping payload, normalized best-effort
    Opaque {
        /// Item identifier when one can be extracted
        id: String,
        /// Type name of the original payload
        class: String,
        /// Best-effort text rendering of the payload
        string: String,
    },
}

impl WarningItem {
    /// Snapshot an arbitrary item payload
    ///
    /// Capture must never fail the step: a payload that cannot be
    /// serialized or rendered yields `[unknown]` fields instead of an
    /// error.
    pub fn capture<T: Serialize + ?Sized>(item: &T) -> Self {
        let class = std::any::type_name::<T>().to_string();
        match serde_json::to_value(item) {
            Ok(Value::Object(map)) => WarningItem::Structured(map),
            Ok(other) => WarningItem::Opaque {
                id: UNKNOWN_FIELD.to_string(),
                class,
                string: other.to_string(),
            },
            Err(_) => WarningItem::Opaque {
                id: UNKNOWN_FIELD.to_string(),
                class,
                string: UNKNOWN_FIELD.to_string(),
            },
        }
    }
}

/// A single warning raised while processing an item
///
/// Immutable once built; warnings accumulate on the step execution in
/// observation order and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    name: String,
    reason: String,
    reason_parameters: HashMap<String, String>,
    item: WarningItem,
}

impl Warning {
    /// Build a warning record
    pub fn new(
        name: impl Into<String>,
        reason: impl Into<String>,
        reason_parameters: HashMap<String, String>,
        item: WarningItem,
    ) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
            reason_parameters,
            item,
        }
    }

    /// Message template identifier, e.g. `import.steps.validate.title`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message with `%placeholder%` tokens
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Substitution values for the `%placeholder%` tokens
    pub fn reason_parameters(&self) -> &HashMap<String, String> {
        &self.reason_parameters
    }

    /// The item being processed when the warning occurred
    pub fn item(&self) -> &WarningItem {
        &self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_preserves_mappings_verbatim() {
        let mut payload = HashMap::new();
        payload.insert("sku".to_string(), json!("AKNTS_BPXS"));
        payload.insert("enabled".to_string(), json!(false));

        match WarningItem::capture(&payload) {
            WarningItem::Structured(map) => {
                assert_eq!(map.get("sku"), Some(&json!("AKNTS_BPXS")));
                assert_eq!(map.get("enabled"), Some(&json!(false)));
            }
            other => panic!("expected structured item, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_normalizes_non_mappings() {
        match WarningItem::capture("a bare string") {
            WarningItem::Opaque { id, class, string } => {
                assert_eq!(id, UNKNOWN_FIELD);
                assert!(class.ends_with("str"));
                assert_eq!(string, "\"a bare string\"");
            }
            other => panic!("expected opaque item, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_degrades_on_unserializable_items() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(
                &self,
                _serializer: S,
            ) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot be serialized"))
            }
        }

        match WarningItem::capture(&Unserializable) {
            WarningItem::Opaque { id, class, string } => {
                assert_eq!(id, UNKNOWN_FIELD);
                assert!(class.ends_with("Unserializable"));
                assert_eq!(string, UNKNOWN_FIELD);
            }
            other => panic!("expected opaque item, got {other:?}"),
        }
    }
}
