//! OpenTelemetry span wrapper for AWS Lambda stream handlers.
//!
//! This crate wraps a Lambda handler so that every invocation runs inside a
//! single `"handleRequest"` span. The span joins the upstream trace when the
//! input carries trace context, is tagged with the Lambda context and cold
//! start state, and records any error or panic raised by the handler before
//! it is ended.
//!
//! # Architecture
//!
//! Handler authors implement [`StreamHandler`] with their business logic and
//! wrap it in a [`TracedHandler`]. The tracer, propagator and cold start flag
//! are all injected, so tests can substitute an in-memory tracer provider.
//! Tracing is a side channel only: results, errors and panics from the
//! handler reach the caller unchanged.
//!
//! # Usage
//!
//! ```no_run
//! use lambda_runtime::{Context, Error};
//! use opentelemetry::propagation::TextMapPropagator;
//! use opentelemetry::trace::TracerProvider as _;
//! use opentelemetry_lambda_handler::{InvocationInput, StreamHandler, TracedHandler};
//! use opentelemetry_sdk::trace::SdkTracerProvider;
//! use std::io::Write;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl StreamHandler for Greeter {
//!     type Error = std::io::Error;
//!
//!     fn handle(
//!         &self,
//!         _input: &InvocationInput,
//!         output: &mut dyn Write,
//!         _ctx: &Context,
//!     ) -> Result<(), Self::Error> {
//!         output.write_all(br#"{"message": "hello"}"#)
//!     }
//!
//!     fn extract_context(
//!         &self,
//!         propagator: &dyn TextMapPropagator,
//!         input: &InvocationInput,
//!     ) -> Option<opentelemetry::Context> {
//!         opentelemetry_lambda_handler::extract_from_input(propagator, input)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     // Configure exporters on the provider as needed
//!     let provider = SdkTracerProvider::builder().build();
//!     let tracer = provider.tracer("greeter");
//!
//!     let handler = TracedHandler::builder(Greeter, tracer)
//!         .tracer_provider(Arc::new(provider))
//!         .build();
//!
//!     lambda_runtime::run(handler).await
//! }
//! ```
//!
//! # Trace Context Extraction
//!
//! [`StreamHandler::extract_context`] returns no context by default. The
//! [`extract_from_input`] helper looks for W3C headers in:
//!
//! - **JSON events**: an object-valued `"headers"` field
//! - **Requests**: the request's header map
//!
//! Malformed headers are treated as absent and produce a root span.

mod attributes;
mod cold_start;
mod error;
mod handler;
mod headers;
mod input;
mod service;
mod traced;

pub use attributes::{
    AWS_LAMBDA_INVOKED_ARN, AWS_LAMBDA_REMAINING_TIME_MS, ERROR_EVENT, SPAN_NAME, error as error_log,
};
pub use cold_start::ColdStart;
pub use error::InvocationError;
pub use handler::StreamHandler;
pub use headers::extract_from_input;
pub use input::InvocationInput;
pub use traced::{TracedHandler, TracedHandlerBuilder};
