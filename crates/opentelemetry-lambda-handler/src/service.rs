//! Tower Service implementation for running a traced handler on the Lambda
//! runtime.

use crate::error::InvocationError;
use crate::handler::StreamHandler;
use crate::input::InvocationInput;
use crate::traced::TracedHandler;
use lambda_runtime::LambdaEvent;
use opentelemetry::trace::Tracer;
use serde_json::Value;
use std::future::{Ready, ready};
use std::task::{Context, Poll};
use tower::Service;

/// Lets a [`TracedHandler`] be passed straight to `lambda_runtime::run`.
///
/// The event payload becomes [`InvocationInput::Event`] and whatever the
/// handler writes is parsed as the JSON response. Empty output is returned
/// as `null`. Handler errors are forwarded as they are.
///
/// ```ignore
/// lambda_runtime::run(TracedHandler::new(MyHandler, tracer)).await
/// ```
impl<H, T> Service<LambdaEvent<Value>> for TracedHandler<H, T>
where
    H: StreamHandler,
    H::Error: Send + Sync,
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    type Response = Value;
    type Error = lambda_runtime::Error;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: LambdaEvent<Value>) -> Self::Future {
        let (payload, lambda_ctx) = event.into_parts();
        let input = InvocationInput::from(payload);
        let mut output = Vec::new();

        let result = self
            .handle_request(&input, &mut output, &lambda_ctx)
            .map_err(lambda_runtime::Error::from)
            .and_then(|()| parse_output(&output));

        ready(result)
    }
}

fn parse_output(output: &[u8]) -> Result<Value, lambda_runtime::Error> {
    if output.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(output).map_err(|e| InvocationError::InvalidOutput(e).into())
}
