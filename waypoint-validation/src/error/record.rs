//! Error records produced by field validators

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// One validation failure, attributable to exactly one field.
///
/// Besides `field`, a record carries whatever attributes the validator that
/// produced it chose to attach (message keys, hrefs, validator names). The
/// aggregation engine only ever looks at `field`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use waypoint_validation::ErrorRecord;
///
/// let record = ErrorRecord::new("age").with_attr("type", "numeric");
/// assert_eq!(
///     serde_json::to_value(&record).unwrap(),
///     json!({ "field": "age", "type": "numeric" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The field this error belongs to.
    pub field: String,
    /// Validator-defined attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ErrorRecord {
    /// Creates a record for `field` with no attributes.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            attributes: Map::new(),
        }
    }

    /// Sets an attribute.
    ///
    /// The `field` key is reserved: a string value replaces the record's
    /// field, anything else is ignored.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key != "field" {
            self.attributes.insert(key, value);
        } else if let Value::String(field) = value {
            self.field = field;
        }
        self
    }

    /// Returns an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Builds a record from an untyped JSON value.
    ///
    /// Returns `None` unless `value` is an object with a non-empty string
    /// `field`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut attributes) = value else {
            return None;
        };
        let field = match attributes.remove("field") {
            Some(Value::String(field)) if !field.is_empty() => field,
            _ => return None,
        };
        Some(Self { field, attributes })
    }
}
