//! Field → validator mapping for one waypoint

use super::ValidatorSpec;

/// Ordered mapping from field name to its validator spec.
///
/// Iteration follows insertion order; re-inserting a field replaces its spec
/// in place.
#[derive(Debug, Clone, Default)]
pub struct FieldValidators {
    entries: Vec<(String, ValidatorSpec)>,
}

impl FieldValidators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    pub fn field(mut self, name: impl Into<String>, spec: ValidatorSpec) -> Self {
        self.insert(name, spec);
        self
    }

    /// Adds or replaces a field, returning the previous spec.
    pub fn insert(&mut self, name: impl Into<String>, spec: ValidatorSpec) -> Option<ValidatorSpec> {
        let name = name.into();
        match self.entries.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, spec)),
            None => {
                self.entries.push((name, spec));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ValidatorSpec> {
        self.entries
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidatorSpec)> {
        self.entries.iter().map(|(field, spec)| (field.as_str(), spec))
    }
}

impl<K: Into<String>> FromIterator<(K, ValidatorSpec)> for FieldValidators {
    fn from_iter<I: IntoIterator<Item = (K, ValidatorSpec)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, spec) in iter {
            fields.insert(name, spec);
        }
        fields
    }
}
