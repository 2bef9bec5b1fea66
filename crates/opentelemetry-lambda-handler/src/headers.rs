//! Best-effort trace context extraction from invocation headers.
//!
//! Inbound shapes differ by trigger source, so extraction looks for headers
//! in a fixed order and gives up quietly when none are found:
//!
//! 1. a JSON event object with an object-valued `"headers"` field
//! 2. a request whose [`HeaderMap`] carries the headers
//!
//! Anything else yields no context and the invocation span becomes a root.

use crate::input::InvocationInput;
use http::HeaderMap;
use opentelemetry::Context;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use serde_json::{Map, Value};

/// Extracts the upstream trace context carried by `input`, if any.
///
/// A malformed propagation header is treated the same as a missing one:
/// the propagator produces no valid span context and `None` is returned.
pub fn extract_from_input(
    propagator: &dyn TextMapPropagator,
    input: &InvocationInput,
) -> Option<Context> {
    let ctx = match input {
        InvocationInput::Event(Value::Object(event)) => match event.get("headers") {
            Some(Value::Object(headers)) => propagator.extract(&JsonHeadersExtractor(headers)),
            _ => return None,
        },
        InvocationInput::Request(request) => {
            propagator.extract(&HeaderMapExtractor(request.headers()))
        }
        _ => return None,
    };

    ctx.span().span_context().is_valid().then_some(ctx)
}

/// Adapter over the `"headers"` object of a JSON event.
///
/// Only string values are visible to the propagator. Lookups try the exact
/// key first, then fall back to an ASCII case-insensitive match since event
/// sources disagree on header casing.
struct JsonHeadersExtractor<'a>(&'a Map<String, Value>);

impl Extractor for JsonHeadersExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
                    .map(|(_, value)| value)
            })
            .and_then(Value::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, value)| value.is_string())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Adapter to extract from http::HeaderMap using OTel's Extractor trait.
struct HeaderMapExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
