//! Ordered field → errors mapping

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use super::ErrorRecord;

/// Errors grouped by field, in the order fields first produced an error.
///
/// A field is present only if it has at least one record; lists are never
/// empty.
///
/// # Example
///
/// ```
/// use waypoint_validation::{ErrorMap, ErrorRecord};
///
/// let mut errors = ErrorMap::new();
/// errors.push(ErrorRecord::new("age").with_attr("type", "required"));
/// errors.push(ErrorRecord::new("name").with_attr("type", "required"));
/// errors.push(ErrorRecord::new("age").with_attr("type", "numeric"));
///
/// assert_eq!(errors.fields().collect::<Vec<_>>(), ["age", "name"]);
/// assert_eq!(errors.get("age").map(|e| e.len()), Some(2));
///
/// let reduced = errors.reduce_to_first();
/// assert_eq!(reduced.total_errors(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMap {
    entries: Vec<(String, Vec<ErrorRecord>)>,
}

impl ErrorMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the list for `record.field`, creating the entry on
    /// first occurrence. A stray `field` attribute is dropped so the record
    /// serializes under the key it was grouped by.
    pub fn push(&mut self, mut record: ErrorRecord) {
        record.attributes.remove("field");
        match self.entries.iter_mut().find(|(field, _)| *field == record.field) {
            Some((_, records)) => records.push(record),
            None => self.entries.push((record.field.clone(), vec![record])),
        }
    }

    /// Returns the errors for a field.
    pub fn get(&self, field: &str) -> Option<&[ErrorRecord]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, records)| records.as_slice())
    }

    /// Returns `true` if `field` has at least one error.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records across all fields.
    pub fn total_errors(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ErrorRecord])> {
        self.entries
            .iter()
            .map(|(field, records)| (field.as_str(), records.as_slice()))
    }

    /// Keeps only the first record of every field.
    pub fn reduce_to_first(mut self) -> Self {
        for (_, records) in &mut self.entries {
            records.truncate(1);
        }
        self
    }
}

impl Extend<ErrorRecord> for ErrorMap {
    fn extend<I: IntoIterator<Item = ErrorRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<ErrorRecord> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = ErrorRecord>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl IntoIterator for ErrorMap {
    type Item = (String, Vec<ErrorRecord>);
    type IntoIter = std::vec::IntoIter<(String, Vec<ErrorRecord>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, records) in &self.entries {
            map.serialize_entry(field, records)?;
        }
        map.end()
    }
}
