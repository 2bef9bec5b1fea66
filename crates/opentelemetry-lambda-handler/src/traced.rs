//! Span-wrapping entry point for stream handlers.

use crate::attributes::{self, SPAN_NAME};
use crate::cold_start::ColdStart;
use crate::handler::StreamHandler;
use crate::input::InvocationInput;
use lambda_runtime::Context as LambdaContext;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanKind, SpanRef, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, ContextGuard};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Wraps a [`StreamHandler`] so that every invocation runs inside a span.
///
/// For each call to [`handle_request`](Self::handle_request) the wrapper:
/// 1. Asks the handler for the upstream trace context
/// 2. Starts a `"handleRequest"` server span, a root span if there is no
///    upstream context, and makes it the active span
/// 3. Records Lambda context and cold start attributes
/// 4. Runs the handler exactly once
/// 5. Logs any error or panic on the span
/// 6. Ends the span and optionally flushes the configured providers
///
/// The handler's result is returned untouched and panics are resumed after
/// the span has ended.
///
/// # Type Parameters
///
/// * `H` - The wrapped handler
/// * `T` - The tracer that creates invocation spans
///
/// # Example
///
/// ```ignore
/// use opentelemetry::trace::TracerProvider as _;
/// use opentelemetry_lambda_handler::TracedHandler;
///
/// let tracer = provider.tracer("my-function");
/// let handler = TracedHandler::builder(MyHandler, tracer)
///     .tracer_provider(Arc::new(provider))
///     .build();
/// ```
#[derive(Clone)]
pub struct TracedHandler<H, T> {
    handler: H,
    tracer: T,
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
    cold_start: Arc<ColdStart>,
    tracer_provider: Option<Arc<SdkTracerProvider>>,
    logger_provider: Option<Arc<SdkLoggerProvider>>,
    flush_on_end: bool,
}

impl<H, T> TracedHandler<H, T> {
    /// Wraps `handler` using default settings:
    /// - W3C trace context propagator
    /// - Process-wide cold start flag
    /// - Flush on end: enabled
    /// - No tracer or logger provider (nothing is flushed)
    pub fn new(handler: H, tracer: T) -> Self {
        TracedHandlerBuilder::new(handler, tracer).build()
    }

    /// Creates a builder for more detailed configuration.
    pub fn builder(handler: H, tracer: T) -> TracedHandlerBuilder<H, T> {
        TracedHandlerBuilder::new(handler, tracer)
    }

    /// Returns the wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H, T> TracedHandler<H, T>
where
    H: StreamHandler,
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    /// Runs one traced invocation of the wrapped handler.
    pub fn handle_request(
        &self,
        input: &InvocationInput,
        output: &mut dyn Write,
        lambda_ctx: &LambdaContext,
    ) -> Result<(), H::Error> {
        let parent = self.handler.extract_context(self.propagator.as_ref(), input);
        if parent.is_none() {
            tracing::debug!(
                target: "otel_lifecycle",
                request_id = %lambda_ctx.request_id,
                "No upstream trace context, starting root span"
            );
        }

        let outcome = {
            let active = ActiveSpan::start(&self.tracer, parent.unwrap_or_default());
            let span = active.span();

            let is_cold_start = self.cold_start.check();
            for attribute in attributes::invocation_attributes(lambda_ctx, input, is_cold_start) {
                span.set_attribute(attribute);
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.handler.handle(input, &mut *output, lambda_ctx)
            }));

            match &outcome {
                Ok(Ok(())) => span.set_status(Status::Ok),
                Ok(Err(err)) => attributes::record_error(&span, err),
                Err(payload) => attributes::record_panic(&span, payload.as_ref()),
            }

            outcome
        };

        self.flush();

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn flush(&self) {
        if !self.flush_on_end {
            return;
        }

        if let Some(Err(e)) = self.tracer_provider.as_ref().map(|p| p.force_flush()) {
            tracing::warn!(target: "otel_lifecycle", error = ?e, "Failed to flush tracer provider");
        }

        if let Some(Err(e)) = self.logger_provider.as_ref().map(|p| p.force_flush()) {
            tracing::warn!(target: "otel_lifecycle", error = ?e, "Failed to flush logger provider");
        }
    }
}

/// The invocation span, active for as long as this guard lives.
///
/// Dropping the guard ends the span, whichever way the invocation exits.
struct ActiveSpan {
    cx: Context,
    _attached: ContextGuard,
}

impl ActiveSpan {
    fn start<T>(tracer: &T, parent: Context) -> Self
    where
        T: Tracer,
        T::Span: Send + Sync + 'static,
    {
        let span = tracer
            .span_builder(SPAN_NAME)
            .with_kind(SpanKind::Server)
            .start_with_context(tracer, &parent);
        let cx = parent.with_span(span);
        let attached = cx.clone().attach();

        Self {
            cx,
            _attached: attached,
        }
    }

    fn span(&self) -> SpanRef<'_> {
        self.cx.span()
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

/// Builder for configuring a [`TracedHandler`].
///
/// # Example
///
/// ```ignore
/// use opentelemetry_lambda_handler::{ColdStart, TracedHandler};
///
/// let handler = TracedHandler::builder(MyHandler, tracer)
///     .cold_start(Arc::new(ColdStart::new()))
///     .flush_on_end(false)
///     .build();
/// ```
#[must_use = "builders do nothing unless .build() is called"]
pub struct TracedHandlerBuilder<H, T> {
    handler: H,
    tracer: T,
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
    cold_start: Arc<ColdStart>,
    tracer_provider: Option<Arc<SdkTracerProvider>>,
    logger_provider: Option<Arc<SdkLoggerProvider>>,
    flush_on_end: bool,
}

impl<H, T> TracedHandlerBuilder<H, T> {
    /// Creates a new builder for the given handler and tracer.
    pub fn new(handler: H, tracer: T) -> Self {
        Self {
            handler,
            tracer,
            propagator: Arc::new(TraceContextPropagator::new()),
            cold_start: ColdStart::process(),
            tracer_provider: None,
            logger_provider: None,
            flush_on_end: true,
        }
    }

    /// Sets the propagator handed to [`StreamHandler::extract_context`].
    ///
    /// Default: W3C trace context
    pub fn propagator<P>(mut self, propagator: P) -> Self
    where
        P: TextMapPropagator + Send + Sync + 'static,
    {
        self.propagator = Arc::new(propagator);
        self
    }

    /// Sets the cold start flag.
    ///
    /// Default: [`ColdStart::process`]. Wrappers that share a flag report at
    /// most one cold start between them.
    pub fn cold_start(mut self, cold_start: Arc<ColdStart>) -> Self {
        self.cold_start = cold_start;
        self
    }

    /// Sets the tracer provider to flush after each invocation.
    pub fn tracer_provider(mut self, provider: Arc<SdkTracerProvider>) -> Self {
        self.tracer_provider = Some(provider);
        self
    }

    /// Sets the logger provider to flush after each invocation.
    ///
    /// If not set, logs will not be explicitly flushed after each invocation.
    pub fn logger_provider(mut self, provider: Arc<SdkLoggerProvider>) -> Self {
        self.logger_provider = Some(provider);
        self
    }

    /// Sets whether to flush the configured providers after each invocation.
    ///
    /// Default: `true`
    ///
    /// Flushing ensures spans are exported before Lambda freezes the
    /// execution environment. Disable only if you're handling flushing
    /// elsewhere (e.g., in an extension).
    pub fn flush_on_end(mut self, flush: bool) -> Self {
        self.flush_on_end = flush;
        self
    }

    /// Builds the configured handler.
    pub fn build(self) -> TracedHandler<H, T> {
        TracedHandler {
            handler: self.handler,
            tracer: self.tracer,
            propagator: self.propagator,
            cold_start: self.cold_start,
            tracer_provider: self.tracer_provider,
            logger_provider: self.logger_provider,
            flush_on_end: self.flush_on_end,
        }
    }
}
