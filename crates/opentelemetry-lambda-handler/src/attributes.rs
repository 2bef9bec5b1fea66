//! Span attributes recorded for each invocation.

use crate::input::InvocationInput;
use lambda_runtime::Context as LambdaContext;
use opentelemetry::KeyValue;
use opentelemetry::trace::{SpanRef, Status};
use opentelemetry_semantic_conventions::attribute::{
    CLOUD_ACCOUNT_ID, CLOUD_PROVIDER, CLOUD_REGION, FAAS_COLDSTART, FAAS_INVOCATION_ID,
    FAAS_MAX_MEMORY, FAAS_NAME, FAAS_TRIGGER, FAAS_VERSION,
};
use std::any::Any;
use std::error::Error;
use std::fmt::Write as _;
use std::time::{Duration, SystemTime};

/// Name of the span created for every invocation.
pub const SPAN_NAME: &str = "handleRequest";

/// ARN of the invoked function, including any alias or version qualifier.
pub const AWS_LAMBDA_INVOKED_ARN: &str = "aws.lambda.invoked_arn";

/// Milliseconds left before the invocation deadline when the span started.
pub const AWS_LAMBDA_REMAINING_TIME_MS: &str = "aws.lambda.remaining_time_ms";

/// Name of the span event describing a failed invocation.
pub const ERROR_EVENT: &str = "error";

/// Error log fields.
pub mod error {
    /// Log entry marker, always `"error"`.
    pub const EVENT: &str = "event";
    /// Always `true` on a failed invocation.
    pub const ERROR: &str = "error";
    /// Type name of the error, or `"panic"`.
    pub const KIND: &str = "error.kind";
    /// Display form of the error.
    pub const OBJECT: &str = "error.object";
    /// Display form of the error.
    pub const MESSAGE: &str = "message";
    /// The error followed by its chain of sources.
    pub const STACK: &str = "stack";
}

const PANIC_KIND: &str = "panic";

/// Builds the attributes describing an invocation.
pub(crate) fn invocation_attributes(
    ctx: &LambdaContext,
    input: &InvocationInput,
    is_cold_start: bool,
) -> Vec<KeyValue> {
    let mut attributes = vec![
        KeyValue::new(CLOUD_PROVIDER, "aws"),
        KeyValue::new(FAAS_INVOCATION_ID, ctx.request_id.clone()),
        KeyValue::new(FAAS_NAME, ctx.env_config.function_name.clone()),
        KeyValue::new(FAAS_VERSION, ctx.env_config.version.clone()),
        KeyValue::new(
            FAAS_MAX_MEMORY,
            ctx.env_config.memory as i64 * 1024 * 1024,
        ),
        KeyValue::new(FAAS_TRIGGER, trigger_type(input)),
        KeyValue::new(FAAS_COLDSTART, is_cold_start),
        KeyValue::new(AWS_LAMBDA_INVOKED_ARN, ctx.invoked_function_arn.clone()),
        KeyValue::new(AWS_LAMBDA_REMAINING_TIME_MS, remaining_time_ms(ctx)),
    ];

    if let Ok(region) = std::env::var("AWS_REGION") {
        attributes.push(KeyValue::new(CLOUD_REGION, region));
    }

    if let Some(account_id) = ctx.invoked_function_arn.split(':').nth(4) {
        attributes.push(KeyValue::new(CLOUD_ACCOUNT_ID, account_id.to_string()));
    }

    attributes
}

fn trigger_type(input: &InvocationInput) -> &'static str {
    if input.has_headers() { "http" } else { "other" }
}

fn remaining_time_ms(ctx: &LambdaContext) -> i64 {
    let deadline = SystemTime::UNIX_EPOCH + Duration::from_millis(ctx.deadline);
    deadline
        .duration_since(SystemTime::now())
        .map(|remaining| i64::try_from(remaining.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Logs a handler error on the span and marks it failed.
pub(crate) fn record_error<E>(span: &SpanRef<'_>, err: &E)
where
    E: Error + ?Sized,
{
    let message = err.to_string();
    let mut stack = message.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(stack, "\nCaused by: {cause}");
        source = cause.source();
    }

    log_error(span, std::any::type_name::<E>(), message, stack);
}

/// Logs a panic payload on the span and marks it failed.
pub(crate) fn record_panic(span: &SpanRef<'_>, payload: &(dyn Any + Send)) {
    let message = panic_message(payload);
    let stack = format!("{PANIC_KIND}: {message}");

    log_error(span, PANIC_KIND, message, stack);
}

fn log_error(span: &SpanRef<'_>, kind: &str, message: String, stack: String) {
    span.add_event(
        ERROR_EVENT,
        vec![
            KeyValue::new(error::EVENT, ERROR_EVENT),
            KeyValue::new(error::ERROR, true),
            KeyValue::new(error::KIND, kind.to_string()),
            KeyValue::new(error::OBJECT, message.clone()),
            KeyValue::new(error::MESSAGE, message.clone()),
            KeyValue::new(error::STACK, stack),
        ],
    );
    span.set_attribute(KeyValue::new(error::ERROR, true));
    span.set_status(Status::error(message));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
