//! Validator dispatch
//!
//! Turns a field → validator mapping into one pending unit per field. The
//! units themselves come from a [`UnitProducer`]; [`RuleRunner`] is the
//! default one.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::trace;

use crate::ErrorRecord;
use crate::JourneyContext;
use crate::aggregate::Rejection;
use crate::aggregate::UnitOutcome;
use crate::validator::FieldValidators;
use crate::validator::ValidatorContext;
use crate::validator::ValidatorSpec;

/// A pending validation of one field.
pub type Unit = BoxFuture<'static, UnitOutcome>;

/// Produces the unit of work that validates a single field.
pub trait UnitProducer: Send + Sync {
    /// Returns a unit for `field_name` on `waypoint_id`.
    ///
    /// The unit settles `Ok(())` when the field is valid and
    /// `Err(Rejection)` with its error records otherwise.
    fn produce(
        &self,
        waypoint_id: &str,
        journey_context: Arc<JourneyContext>,
        field_name: &str,
        spec: &ValidatorSpec,
    ) -> Unit;
}

/// Builds one unit per field, in the mapping's order.
///
/// Nothing is polled here; the units only run once awaited.
pub fn dispatch<P: UnitProducer + ?Sized>(
    producer: &P,
    waypoint_id: &str,
    field_validators: &FieldValidators,
    journey_context: &Arc<JourneyContext>,
) -> Vec<Unit> {
    field_validators
        .iter()
        .map(|(field_name, spec)| {
            producer.produce(waypoint_id, Arc::clone(journey_context), field_name, spec)
        })
        .collect()
}

/// Default unit producer.
///
/// Looks up the field's current value in the journey context and runs every
/// rule of its spec in order, collecting all of their errors. Each record is
/// stamped with the field name, plus `fieldHref` and `validator` attributes
/// when the validator didn't set them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleRunner;

impl UnitProducer for RuleRunner {
    fn produce(
        &self,
        waypoint_id: &str,
        journey_context: Arc<JourneyContext>,
        field_name: &str,
        spec: &ValidatorSpec,
    ) -> Unit {
        let spec = spec.clone();
        let ctx = ValidatorContext {
            waypoint_id: waypoint_id.to_string(),
            field_name: field_name.to_string(),
            journey_context,
        };

        async move {
            let value = ctx
                .journey_context
                .field_value(&ctx.waypoint_id, &ctx.field_name);

            let mut records = Vec::new();
            for (validator, options) in spec.rules() {
                if let Err(errors) = validator.validate(value, options, &ctx).await {
                    trace!(
                        field = %ctx.field_name,
                        validator = validator.name(),
                        count = errors.len(),
                        "rule failed"
                    );
                    records.extend(
                        errors
                            .into_iter()
                            .map(|record| stamp(record, &ctx.field_name, validator.name())),
                    );
                }
            }

            if records.is_empty() {
                Ok(())
            } else {
                Err(Rejection::Errors(records))
            }
        }
        .boxed()
    }
}

fn stamp(mut record: ErrorRecord, field_name: &str, validator: &str) -> ErrorRecord {
    record.field = field_name.to_string();
    record.attributes.remove("field");
    record
        .attributes
        .entry("fieldHref")
        .or_insert_with(|| Value::String(format!("#f-{field_name}")));
    record
        .attributes
        .entry("validator")
        .or_insert_with(|| Value::String(validator.to_string()));
    record
}
