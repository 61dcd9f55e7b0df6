//! Error aggregation over settled validator units
//!
//! Merging is a pure step: it takes whatever the units settled with, groups
//! the error records by field in dispatch order, optionally keeps only the
//! first record per field, and decides the outcome. It never fails on its
//! own. Payloads it can't make sense of count as "no errors".

use serde_json::Value;
use tracing::warn;

use crate::ErrorMap;
use crate::ErrorRecord;
use crate::ValidationErrors;

/// What a validator unit settles with.
pub type UnitOutcome = Result<(), Rejection>;

/// Payload of a failed unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// A list of error records.
    Errors(Vec<ErrorRecord>),
    /// An untyped payload from a collaborator.
    ///
    /// Arrays are salvaged record by record; anything else is ignored.
    Malformed(Value),
}

impl Rejection {
    /// Converts the payload into the records it contributes.
    pub fn into_records(self) -> Vec<ErrorRecord> {
        match self {
            Self::Errors(records) => records,
            Self::Malformed(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| {
                    let record = ErrorRecord::from_value(item);
                    if record.is_none() {
                        warn!("dropping error record without a field");
                    }
                    record
                })
                .collect(),
            Self::Malformed(other) => {
                warn!(payload = %other, "ignoring non-list unit rejection");
                Vec::new()
            }
        }
    }
}

impl From<Vec<ErrorRecord>> for Rejection {
    fn from(records: Vec<ErrorRecord>) -> Self {
        Self::Errors(records)
    }
}

impl From<Value> for Rejection {
    fn from(value: Value) -> Self {
        Self::Malformed(value)
    }
}

/// Groups the records of every failed unit by field, in the order given.
pub fn merge(results: impl IntoIterator<Item = UnitOutcome>) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for rejection in results.into_iter().filter_map(Result::err) {
        for record in rejection.into_records() {
            if record.field.is_empty() {
                warn!("dropping error record with an empty field");
                continue;
            }
            errors.push(record);
        }
    }
    errors
}

/// Merges unit results and resolves the page outcome.
///
/// With `reduce_errors`, each field keeps only its first record.
pub fn aggregate(
    results: impl IntoIterator<Item = UnitOutcome>,
    reduce_errors: bool,
) -> Result<(), ValidationErrors> {
    let mut errors = merge(results);
    if reduce_errors {
        errors = errors.reduce_to_first();
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors::new(errors))
    }
}
