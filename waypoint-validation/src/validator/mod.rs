//! Validator capability and per-field validator configuration

mod fields;

pub use fields::*;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::ErrorRecord;
use crate::JourneyContext;

/// What a validator sees besides the value and its options.
#[derive(Debug, Clone)]
pub struct ValidatorContext {
    /// The waypoint being validated.
    pub waypoint_id: String,
    /// The field the validator is attached to.
    pub field_name: String,
    /// Shared, read-only journey state.
    pub journey_context: Arc<JourneyContext>,
}

/// A single validation rule.
///
/// Options are passed explicitly on every call, so one validator instance
/// can serve differently configured fields.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Name used in logs and in the `validator` attribute of records.
    fn name(&self) -> &str;

    /// Validates `value` (absent if the field was never submitted).
    ///
    /// Returned records don't need `field` set correctly; the caller stamps
    /// it with the field being validated.
    async fn validate(
        &self,
        value: Option<&Value>,
        options: &Value,
        ctx: &ValidatorContext,
    ) -> Result<(), Vec<ErrorRecord>>;
}

/// A configured validator for one field: a single rule or a list of rules.
#[derive(Clone)]
pub enum ValidatorSpec {
    /// One rule with its options.
    Rule {
        validator: Arc<dyn Validator>,
        options: Value,
    },
    /// Several specs, evaluated in order.
    Composite(Vec<ValidatorSpec>),
}

impl ValidatorSpec {
    /// Wraps a validator with no options.
    pub fn rule(validator: impl Validator + 'static) -> Self {
        Self::Rule {
            validator: Arc::new(validator),
            options: Value::Null,
        }
    }

    /// Sets the options of a `Rule`. Has no effect on a `Composite`.
    pub fn with_options(self, options: Value) -> Self {
        match self {
            Self::Rule { validator, .. } => Self::Rule { validator, options },
            composite => composite,
        }
    }

    /// Combines several specs.
    pub fn all(specs: impl IntoIterator<Item = ValidatorSpec>) -> Self {
        Self::Composite(specs.into_iter().collect())
    }

    /// Flattens the spec into its rules, depth-first.
    pub fn rules(&self) -> Vec<(&Arc<dyn Validator>, &Value)> {
        let mut out = Vec::new();
        self.collect_rules(&mut out);
        out
    }

    fn collect_rules<'a>(&'a self, out: &mut Vec<(&'a Arc<dyn Validator>, &'a Value)>) {
        match self {
            Self::Rule { validator, options } => out.push((validator, options)),
            Self::Composite(specs) => specs.iter().for_each(|spec| spec.collect_rules(out)),
        }
    }
}

impl fmt::Debug for ValidatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule { validator, options } => f
                .debug_struct("Rule")
                .field("validator", &validator.name())
                .field("options", options)
                .finish(),
            Self::Composite(specs) => f.debug_tuple("Composite").field(specs).finish(),
        }
    }
}

/// Adapts a synchronous closure into a [`Validator`].
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use waypoint_validation::ErrorRecord;
/// use waypoint_validation::validator::{ValidatorSpec, from_fn};
///
/// let required = from_fn("required", |value, _options, ctx| match value {
///     Some(Value::String(s)) if !s.is_empty() => Ok(()),
///     _ => Err(vec![ErrorRecord::new(&ctx.field_name).with_attr("type", "required")]),
/// });
/// let spec = ValidatorSpec::rule(required);
/// ```
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnValidator<F>
where
    F: Fn(Option<&Value>, &Value, &ValidatorContext) -> Result<(), Vec<ErrorRecord>> + Send + Sync,
{
    FnValidator {
        name: name.into(),
        f,
    }
}

/// Validator backed by a closure. See [`from_fn`].
pub struct FnValidator<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&Value>, &Value, &ValidatorContext) -> Result<(), Vec<ErrorRecord>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(
        &self,
        value: Option<&Value>,
        options: &Value,
        ctx: &ValidatorContext,
    ) -> Result<(), Vec<ErrorRecord>> {
        (self.f)(value, options, ctx)
    }
}
