//! The business-logic half of a traced Lambda handler.

use crate::input::InvocationInput;
use lambda_runtime::Context as LambdaContext;
use opentelemetry::Context;
use opentelemetry::propagation::TextMapPropagator;
use std::io::Write;

/// A Lambda handler that reads an invocation input and writes its response
/// to an output sink.
///
/// Implementors supply [`handle`](StreamHandler::handle) and wrap the handler
/// in a [`TracedHandler`](crate::TracedHandler), whose
/// [`handle_request`](crate::TracedHandler::handle_request) is the entry point
/// the runtime calls.
///
/// # Example
///
/// ```
/// use lambda_runtime::Context;
/// use opentelemetry_lambda_handler::{InvocationInput, StreamHandler};
/// use std::io::Write;
///
/// struct Echo;
///
/// impl StreamHandler for Echo {
///     type Error = std::io::Error;
///
///     fn handle(
///         &self,
///         input: &InvocationInput,
///         output: &mut dyn Write,
///         _ctx: &Context,
///     ) -> Result<(), Self::Error> {
///         if let InvocationInput::Stream(bytes) = input {
///             output.write_all(bytes)?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait StreamHandler {
    /// Error returned by the business logic.
    type Error: std::error::Error + 'static;

    /// Runs the business logic for one invocation.
    fn handle(
        &self,
        input: &InvocationInput,
        output: &mut dyn Write,
        ctx: &LambdaContext,
    ) -> Result<(), Self::Error>;

    /// Extracts the upstream trace context from the input.
    ///
    /// The default returns `None`, so every invocation starts a root span.
    /// Override to join upstream traces, typically by delegating to
    /// [`extract_from_input`](crate::extract_from_input).
    fn extract_context(
        &self,
        _propagator: &dyn TextMapPropagator,
        _input: &InvocationInput,
    ) -> Option<Context> {
        None
    }
}
