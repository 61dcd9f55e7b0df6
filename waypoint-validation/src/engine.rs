//! Page validation entry point

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;
use tracing::trace;

use crate::JourneyContext;
use crate::ValidationErrors;
use crate::aggregate::aggregate;
use crate::dispatch::RuleRunner;
use crate::dispatch::UnitProducer;
use crate::dispatch::dispatch;
use crate::validator::FieldValidators;

/// Options for validating one waypoint.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use waypoint_validation::{JourneyContext, ValidateOptions};
/// use waypoint_validation::validator::FieldValidators;
///
/// let options = ValidateOptions::new("contact-details")
///     .with_field_validators(FieldValidators::new())
///     .with_journey_context(JourneyContext::new().with_page("contact-details", json!({})))
///     .with_reduce_errors(true);
/// assert!(options.reduce_errors);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// The waypoint being validated. Passed through to validators untouched.
    pub waypoint_id: String,

    /// Validators to run, keyed by field.
    ///
    /// Default: empty
    pub field_validators: FieldValidators,

    /// Journey state shared with every validator.
    ///
    /// Default: empty
    pub journey_context: Arc<JourneyContext>,

    /// Keep only the first error of each field.
    ///
    /// Default: `false`
    pub reduce_errors: bool,
}

impl ValidateOptions {
    /// Creates options for a waypoint with default values.
    pub fn new(waypoint_id: impl Into<String>) -> Self {
        Self {
            waypoint_id: waypoint_id.into(),
            ..Self::default()
        }
    }

    /// Sets the field validators.
    pub fn with_field_validators(mut self, field_validators: FieldValidators) -> Self {
        self.field_validators = field_validators;
        self
    }

    /// Sets the journey context.
    pub fn with_journey_context(mut self, journey_context: impl Into<Arc<JourneyContext>>) -> Self {
        self.journey_context = journey_context.into();
        self
    }

    /// Sets whether each field's errors are reduced to the first one.
    pub fn with_reduce_errors(mut self, reduce_errors: bool) -> Self {
        self.reduce_errors = reduce_errors;
        self
    }
}

/// Validates waypoints by running their field validators concurrently.
///
/// Units are joined with [`join_all`], so every field is validated even when
/// others fail, and all of them are polled on the caller's task.
#[derive(Debug, Clone, Default)]
pub struct PageValidator<P = RuleRunner> {
    producer: P,
}

impl PageValidator<RuleRunner> {
    /// Creates a validator using [`RuleRunner`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: UnitProducer> PageValidator<P> {
    /// Creates a validator with a custom unit producer.
    pub fn with_producer(producer: P) -> Self {
        Self { producer }
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// Validates one waypoint.
    ///
    /// Returns `Ok(())` if no field reported an error, otherwise the errors
    /// grouped by field.
    pub async fn validate(&self, options: ValidateOptions) -> Result<(), ValidationErrors> {
        let ValidateOptions {
            waypoint_id,
            field_validators,
            journey_context,
            reduce_errors,
        } = options;

        let units = dispatch(&self.producer, &waypoint_id, &field_validators, &journey_context);
        if units.is_empty() {
            debug!(waypoint = %waypoint_id, "no field validators");
            return Ok(());
        }

        debug!(waypoint = %waypoint_id, units = units.len(), "validating fields");
        let results = join_all(units).await;
        for ((field, _), result) in field_validators.iter().zip(&results) {
            match result {
                Ok(()) => trace!(waypoint = %waypoint_id, field = %field, "unit passed"),
                Err(_) => trace!(waypoint = %waypoint_id, field = %field, "unit rejected"),
            }
        }
        let outcome = aggregate(results, reduce_errors);

        match &outcome {
            Ok(()) => debug!(waypoint = %waypoint_id, "waypoint valid"),
            Err(err) => debug!(
                waypoint = %waypoint_id,
                fields = err.errors().len(),
                errors = err.errors().total_errors(),
                "waypoint invalid"
            ),
        }
        outcome
    }
}

/// Validates one waypoint with the default [`RuleRunner`].
///
/// # Example
///
/// ```
/// # futures::executor::block_on(async {
/// use serde_json::{Value, json};
/// use waypoint_validation::{ErrorRecord, JourneyContext, ValidateOptions, validate};
/// use waypoint_validation::validator::{FieldValidators, ValidatorSpec, from_fn};
///
/// let required = from_fn("required", |value, _, ctx| match value {
///     Some(Value::String(s)) if !s.is_empty() => Ok(()),
///     _ => Err(vec![ErrorRecord::new(&ctx.field_name).with_attr("type", "required")]),
/// });
///
/// let options = ValidateOptions::new("details")
///     .with_field_validators(FieldValidators::new().field("name", ValidatorSpec::rule(required)))
///     .with_journey_context(JourneyContext::new().with_page("details", json!({ "name": "" })));
///
/// let errors = validate(options).await.unwrap_err();
/// assert!(errors.errors().contains("name"));
/// # });
/// ```
pub async fn validate(options: ValidateOptions) -> Result<(), ValidationErrors> {
    PageValidator::new().validate(options).await
}
