//! Fuzz target for trace context extraction from invocation payloads.
//!
//! Run with: `cargo +nightly fuzz run fuzz_headers`

#![no_main]

use libfuzzer_sys::fuzz_target;
use opentelemetry_lambda_handler::{InvocationInput, extract_from_input};
use opentelemetry_sdk::propagation::TraceContextPropagator;

fuzz_target!(|data: &[u8]| {
    let input = InvocationInput::from_payload(data.to_vec());
    let _ = extract_from_input(&TraceContextPropagator::new(), &input);
});
