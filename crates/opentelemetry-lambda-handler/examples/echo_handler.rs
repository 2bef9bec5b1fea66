//! Echo Lambda example with OpenTelemetry tracing.
//!
//! The handler writes the incoming event back as its response. Trace context
//! is taken from an API Gateway style `headers` object when present, so the
//! invocation span joins the caller's trace.
//!
//! # Running
//!
//! ```bash
//! cargo build --example echo_handler --release
//! ```

use lambda_runtime::{Context, Error};
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_lambda_handler::{InvocationInput, StreamHandler, TracedHandler, extract_from_input};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::io::Write;
use std::sync::Arc;

struct Echo;

impl StreamHandler for Echo {
    type Error = std::io::Error;

    fn handle(
        &self,
        input: &InvocationInput,
        output: &mut dyn Write,
        ctx: &Context,
    ) -> Result<(), Self::Error> {
        tracing::info!(request_id = %ctx.request_id, "Echoing event");

        match input {
            InvocationInput::Event(event) => serde_json::to_writer(output, event)?,
            InvocationInput::Stream(bytes) => output.write_all(bytes)?,
            InvocationInput::Request(request) => output.write_all(request.body())?,
        }
        Ok(())
    }

    fn extract_context(
        &self,
        propagator: &dyn TextMapPropagator,
        input: &InvocationInput,
    ) -> Option<opentelemetry::Context> {
        extract_from_input(propagator, input)
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    // Attach an exporter here, e.g. OTLP towards a collector extension.
    let provider = SdkTracerProvider::builder().build();
    let tracer = provider.tracer("echo-handler");

    let handler = TracedHandler::builder(Echo, tracer)
        .tracer_provider(Arc::new(provider))
        .build();

    lambda_runtime::run(handler).await
}
