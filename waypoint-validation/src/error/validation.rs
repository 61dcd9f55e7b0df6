//! Aggregated page validation failure

use super::ErrorMap;

/// Returned when one or more fields of a waypoint failed validation.
///
/// The wrapped [`ErrorMap`] is never empty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("validation failed for {} field(s): {}", .errors.len(), field_list(.errors))]
pub struct ValidationErrors {
    errors: ErrorMap,
}

impl ValidationErrors {
    pub(crate) fn new(errors: ErrorMap) -> Self {
        Self { errors }
    }

    /// Returns the per-field errors.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Consumes self, returning the per-field errors.
    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }
}

fn field_list(errors: &ErrorMap) -> String {
    errors.fields().collect::<Vec<_>>().join(", ")
}

impl serde::Serialize for ValidationErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.errors, serializer)
    }
}
