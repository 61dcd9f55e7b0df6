//! End-to-end page validation scenarios.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use serde_json::json;
use tokio::sync::oneshot;
use waypoint_validation::ErrorRecord;
use waypoint_validation::JourneyContext;
use waypoint_validation::PageValidator;
use waypoint_validation::ValidateOptions;
use waypoint_validation::aggregate::Rejection;
use waypoint_validation::aggregate::UnitOutcome;
use waypoint_validation::dispatch::Unit;
use waypoint_validation::dispatch::UnitProducer;
use waypoint_validation::validate;
use waypoint_validation::validator::FieldValidators;
use waypoint_validation::validator::ValidatorSpec;
use waypoint_validation::validator::from_fn;

fn record(field: &str, kind: &str) -> ErrorRecord {
    ErrorRecord::new(field).with_attr("type", kind)
}

fn noop() -> ValidatorSpec {
    ValidatorSpec::rule(from_fn("noop", |_, _, _| Ok(())))
}

fn fields(names: &[&str]) -> FieldValidators {
    names.iter().map(|name| (*name, noop())).collect()
}

/// Settles each field's unit with a preset outcome.
#[derive(Default)]
struct Scripted {
    outcomes: HashMap<String, UnitOutcome>,
    calls: AtomicUsize,
}

impl Scripted {
    fn fail(mut self, field: &str, records: Vec<ErrorRecord>) -> Self {
        self.outcomes
            .insert(field.to_string(), Err(Rejection::Errors(records)));
        self
    }
}

impl UnitProducer for Scripted {
    fn produce(
        &self,
        _waypoint_id: &str,
        _journey_context: Arc<JourneyContext>,
        field_name: &str,
        _spec: &ValidatorSpec,
    ) -> Unit {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcomes.get(field_name).cloned().unwrap_or(Ok(()));
        async move { outcome }.boxed()
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_empty_validators_succeed_without_dispatch() {
    let validator = PageValidator::with_producer(Scripted::default());

    let result = validator.validate(ValidateOptions::new("page")).await;

    assert_eq!(result, Ok(()));
    assert_eq!(validator.producer().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_passing_field_succeeds() {
    let validator = PageValidator::with_producer(Scripted::default());
    let options = ValidateOptions::new("page").with_field_validators(fields(&["name"]));

    assert_eq!(validator.validate(options).await, Ok(()));
    assert_eq!(validator.producer().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_only_failing_fields_are_reported() {
    let producer = Scripted::default().fail("name", vec![record("name", "required")]);
    let validator = PageValidator::with_producer(producer);
    let options = ValidateOptions::new("page").with_field_validators(fields(&["name", "age"]));

    let errors = validator.validate(options).await.unwrap_err();

    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!({ "name": [{ "field": "name", "type": "required" }] })
    );
}

#[tokio::test]
async fn test_reduce_errors_keeps_first() {
    let producer = Scripted::default().fail(
        "age",
        vec![record("age", "required"), record("age", "numeric")],
    );
    let validator = PageValidator::with_producer(producer);
    let options = ValidateOptions::new("page")
        .with_field_validators(fields(&["age"]))
        .with_reduce_errors(true);

    let errors = validator.validate(options).await.unwrap_err();

    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!({ "age": [{ "field": "age", "type": "required" }] })
    );
}

#[tokio::test]
async fn test_unreduced_errors_keep_every_field() {
    let producer = Scripted::default()
        .fail("name", vec![record("name", "required")])
        .fail("age", vec![record("age", "numeric")]);
    let validator = PageValidator::with_producer(producer);
    let options = ValidateOptions::new("page").with_field_validators(fields(&["name", "age"]));

    let errors = validator.validate(options).await.unwrap_err().into_errors();

    assert_eq!(errors.fields().collect::<Vec<_>>(), ["name", "age"]);
    assert_eq!(errors.get("name"), Some([record("name", "required")].as_slice()));
    assert_eq!(errors.get("age"), Some([record("age", "numeric")].as_slice()));
}

#[tokio::test]
async fn test_reduce_without_duplicates_changes_nothing() {
    let producer = Scripted::default()
        .fail("a", vec![record("a", "x")])
        .fail("b", vec![record("b", "y")]);
    let validator = PageValidator::with_producer(producer);
    let base = ValidateOptions::new("page").with_field_validators(fields(&["a", "b"]));

    let reduced = validator
        .validate(base.clone().with_reduce_errors(true))
        .await
        .unwrap_err();
    let full = validator.validate(base).await.unwrap_err();

    assert_eq!(reduced, full);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Field `a` can only settle after field `b` has run.
struct Handoff {
    sender: Mutex<Option<oneshot::Sender<()>>>,
    receiver: Mutex<Option<oneshot::Receiver<()>>>,
}

impl UnitProducer for Handoff {
    fn produce(
        &self,
        _waypoint_id: &str,
        _journey_context: Arc<JourneyContext>,
        field_name: &str,
        _spec: &ValidatorSpec,
    ) -> Unit {
        match field_name {
            "a" => {
                let receiver = self.receiver.lock().unwrap().take();
                async move {
                    if let Some(receiver) = receiver {
                        let _ = receiver.await;
                    }
                    Err::<(), _>(Rejection::Errors(vec![record("a", "late")]))
                }
                .boxed()
            }
            _ => {
                let sender = self.sender.lock().unwrap().take();
                async move {
                    if let Some(sender) = sender {
                        let _ = sender.send(());
                    }
                    Err::<(), _>(Rejection::Errors(vec![record("b", "early")]))
                }
                .boxed()
            }
        }
    }
}

#[tokio::test]
async fn test_units_run_concurrently() {
    let (sender, receiver) = oneshot::channel();
    let validator = PageValidator::with_producer(Handoff {
        sender: Mutex::new(Some(sender)),
        receiver: Mutex::new(Some(receiver)),
    });
    let options = ValidateOptions::new("page").with_field_validators(fields(&["a", "b"]));

    let result = tokio::time::timeout(Duration::from_secs(5), validator.validate(options))
        .await
        .expect("units should not wait on each other sequentially");

    let errors = result.unwrap_err().into_errors();
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["a", "b"]);
}

/// Settles each field after a per-field delay.
struct Delayed(HashMap<&'static str, u64>);

impl UnitProducer for Delayed {
    fn produce(
        &self,
        _waypoint_id: &str,
        _journey_context: Arc<JourneyContext>,
        field_name: &str,
        _spec: &ValidatorSpec,
    ) -> Unit {
        let delay = self.0.get(field_name).copied().unwrap_or(0);
        let field = field_name.to_string();
        async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Err::<(), _>(Rejection::Errors(vec![ErrorRecord::new(field)]))
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_field_order_follows_dispatch_not_settlement() {
    let validator = PageValidator::with_producer(Delayed(HashMap::from([
        ("slow", 40),
        ("medium", 20),
        ("fast", 0),
    ])));
    let options =
        ValidateOptions::new("page").with_field_validators(fields(&["slow", "medium", "fast"]));

    let errors = validator.validate(options).await.unwrap_err().into_errors();

    assert_eq!(errors.fields().collect::<Vec<_>>(), ["slow", "medium", "fast"]);
}

#[tokio::test]
async fn test_malformed_rejections_do_not_fail_the_page() {
    struct Malformed;

    impl UnitProducer for Malformed {
        fn produce(
            &self,
            _waypoint_id: &str,
            _journey_context: Arc<JourneyContext>,
            _field_name: &str,
            _spec: &ValidatorSpec,
        ) -> Unit {
            async { Err::<(), _>(Rejection::Malformed(json!({ "field": "name" }))) }.boxed()
        }
    }

    let validator = PageValidator::with_producer(Malformed);
    let options = ValidateOptions::new("page").with_field_validators(fields(&["name"]));

    assert_eq!(validator.validate(options).await, Ok(()));
}

// =============================================================================
// Default rule runner
// =============================================================================

fn required() -> ValidatorSpec {
    ValidatorSpec::rule(from_fn("required", |value, _, _| match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        _ => Err(vec![ErrorRecord::new("").with_attr("message", "required")]),
    }))
}

fn max_length(max: u64) -> ValidatorSpec {
    ValidatorSpec::rule(from_fn("maxLength", |value, options, _| {
        let max = options["max"].as_u64().unwrap_or(u64::MAX);
        match value.and_then(Value::as_str) {
            Some(s) if (s.chars().count() as u64) > max => {
                Err(vec![ErrorRecord::new("").with_attr("message", "too long")])
            }
            _ => Ok(()),
        }
    }))
    .with_options(json!({ "max": max }))
}

#[tokio::test]
async fn test_rule_runner_collects_every_rule() {
    let journey = JourneyContext::new().with_page(
        "contact",
        json!({ "name": "", "address": { "postcode": "AB1 2CDEFGH" }, "email": "a@b.c" }),
    );
    let validators = FieldValidators::new()
        .field("name", ValidatorSpec::all([required(), max_length(3)]))
        .field("address[postcode]", ValidatorSpec::all([required(), max_length(8)]))
        .field("email", required())
        .field("phone", required());

    let options = ValidateOptions::new("contact")
        .with_field_validators(validators)
        .with_journey_context(journey);

    let errors = validate(options).await.unwrap_err().into_errors();

    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        ["name", "address[postcode]", "phone"]
    );

    let postcode = errors.get("address[postcode]").unwrap();
    assert_eq!(postcode.len(), 1);
    assert_eq!(postcode[0].attr("validator"), Some(&json!("maxLength")));
    assert_eq!(postcode[0].attr("fieldHref"), Some(&json!("#f-address[postcode]")));

    let phone = errors.get("phone").unwrap();
    assert_eq!(phone[0].field, "phone");
    assert_eq!(phone[0].attr("message"), Some(&json!("required")));
}

#[tokio::test]
async fn test_rule_runner_reduces_to_first_rule() {
    let journey = JourneyContext::new().with_page("p", json!({ "code": "     " }));
    let spec = ValidatorSpec::all([
        required(),
        ValidatorSpec::rule(from_fn("alphanumeric", |_, _, _| {
            Err(vec![ErrorRecord::new("").with_attr("message", "alphanumeric")])
        })),
    ]);
    let options = ValidateOptions::new("p")
        .with_field_validators(FieldValidators::new().field("code", spec))
        .with_journey_context(journey);

    let full = validate(options.clone()).await.unwrap_err();
    assert_eq!(full.errors().total_errors(), 2);

    let reduced = validate(options.with_reduce_errors(true)).await.unwrap_err();
    let code = reduced.errors().get("code").unwrap();
    assert_eq!(code.len(), 1);
    assert_eq!(code[0].attr("validator"), Some(&json!("required")));
}

#[tokio::test]
async fn test_validators_see_waypoint_and_shared_context() {
    let journey = JourneyContext::new()
        .with_page("start", json!({ "country": "UK" }))
        .with_page("address", json!({ "postcode": "" }));
    let spec = ValidatorSpec::rule(from_fn("conditional", |value, _, ctx| {
        assert_eq!(ctx.waypoint_id, "address");
        assert_eq!(ctx.field_name, "postcode");
        let uk = ctx.journey_context.field_value("start", "country") == Some(&json!("UK"));
        match value.and_then(Value::as_str) {
            Some("") if uk => Err(vec![ErrorRecord::new("")]),
            _ => Ok(()),
        }
    }));
    let options = ValidateOptions::new("address")
        .with_field_validators(FieldValidators::new().field("postcode", spec))
        .with_journey_context(journey);

    let errors = validate(options).await.unwrap_err();
    assert!(errors.errors().contains("postcode"));
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_every_settled_unit_is_traced() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let producer = Scripted::default().fail("b", vec![record("b", "required")]);
    let validator = PageValidator::with_producer(producer);
    let options = ValidateOptions::new("page").with_field_validators(fields(&["a", "b"]));
    let _ = validator.validate(options).await;

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("unit passed").count(), 1, "{output}");
    assert_eq!(output.matches("unit rejected").count(), 1, "{output}");
    assert!(output.contains("field=a"), "{output}");
    assert!(output.contains("field=b"), "{output}");
}
