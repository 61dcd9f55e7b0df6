//! Journey context and bracket-qualified field paths

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Read-only state of a journey, handed unchanged to every field validator.
///
/// Holds the submitted data for each waypoint as a JSON value, usually an
/// object keyed by field name.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use waypoint_validation::JourneyContext;
///
/// let ctx = JourneyContext::new()
///     .with_page("personal-details", json!({ "name": "Ada", "address": { "town": "Leeds" } }));
///
/// assert_eq!(ctx.field_value("personal-details", "name"), Some(&json!("Ada")));
/// assert_eq!(ctx.field_value("personal-details", "address[town]"), Some(&json!("Leeds")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JourneyContext {
    pages: HashMap<String, Value>,
}

impl JourneyContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data for a waypoint.
    pub fn with_page(mut self, waypoint_id: impl Into<String>, data: Value) -> Self {
        self.pages.insert(waypoint_id.into(), data);
        self
    }

    /// Returns the data submitted for a waypoint, if any.
    pub fn data_for_page(&self, waypoint_id: &str) -> Option<&Value> {
        self.pages.get(waypoint_id)
    }

    /// Resolves the current value of a field on a waypoint.
    ///
    /// A key matching `field` literally wins; otherwise `field` is treated as
    /// a bracket-qualified [`FieldPath`].
    pub fn field_value(&self, waypoint_id: &str, field: &str) -> Option<&Value> {
        let page = self.data_for_page(waypoint_id)?;
        if let Some(value) = page.get(field) {
            return Some(value);
        }
        FieldPath::parse(field).resolve(page)
    }
}

/// A field name split on the bracket convention: `parent[child][0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a field name.
    ///
    /// Names that don't follow the convention (unbalanced or empty brackets,
    /// empty root) become a single literal segment.
    pub fn parse(name: &str) -> Self {
        Self::try_parse(name).unwrap_or_else(|| Self {
            segments: vec![name.to_string()],
        })
    }

    fn try_parse(name: &str) -> Option<Self> {
        let (root, mut rest) = match name.find('[') {
            Some(idx) => name.split_at(idx),
            None => (name, ""),
        };
        if root.is_empty() || root.contains(']') {
            return None;
        }

        let mut segments = vec![root.to_string()];
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let segment = &inner[..close];
            if segment.is_empty() || segment.contains('[') {
                return None;
            }
            segments.push(segment.to_string());
            rest = &inner[close + 1..];
        }

        Some(Self { segments })
    }

    /// Returns the path segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks `data` along this path. Numeric segments index into arrays.
    pub fn resolve<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.segments.iter();
        if let Some(root) = segments.next() {
            write!(f, "{root}")?;
        }
        for segment in segments {
            write!(f, "[{segment}]")?;
        }
        Ok(())
    }
}
