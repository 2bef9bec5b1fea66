//! Shared fixtures for handler integration tests.

#![allow(dead_code)]

use lambda_runtime::{Config, Context as LambdaContext};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracer, SdkTracerProvider, SpanData};
use std::sync::Arc;

pub const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const PARENT_SPAN_ID: &str = "00f067aa0ba902b7";

/// Tracer provider wired to an in-memory exporter.
pub struct TestTelemetry {
    pub exporter: InMemorySpanExporter,
    pub provider: SdkTracerProvider,
}

impl TestTelemetry {
    /// Spans are exported as soon as they end.
    pub fn simple() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        Self { exporter, provider }
    }

    /// Spans are exported in batches, so they only show up after a flush.
    pub fn batched() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter.clone())
            .build();
        Self { exporter, provider }
    }

    pub fn tracer(&self) -> SdkTracer {
        self.provider.tracer("opentelemetry-lambda-handler-test")
    }

    pub fn shared_provider(&self) -> Arc<SdkTracerProvider> {
        Arc::new(self.provider.clone())
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter
            .get_finished_spans()
            .expect("in-memory exporter should be readable")
    }
}

pub fn lambda_context(request_id: &str) -> LambdaContext {
    let mut config = Config::default();
    config.function_name = "orders".to_string();
    config.memory = 256;
    config.version = "$LATEST".to_string();

    let mut ctx = LambdaContext::default();
    ctx.request_id = request_id.to_string();
    ctx.invoked_function_arn = "arn:aws:lambda:eu-west-1:123456789012:function:orders".to_string();
    ctx.env_config = Arc::new(config);
    ctx
}

pub fn attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a Value> {
    attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}
