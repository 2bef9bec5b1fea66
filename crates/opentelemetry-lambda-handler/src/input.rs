//! Invocation payload shapes delivered to a stream handler.

use serde_json::Value;

/// The input of one Lambda invocation.
///
/// The shape is resolved once when the invocation enters the wrapper, so
/// trace context extraction works over a closed set of variants instead of
/// inspecting the payload at runtime.
#[derive(Debug)]
pub enum InvocationInput {
    /// A JSON event. Objects are treated as string-keyed maps, and an
    /// object-valued `"headers"` field is used as the trace context carrier.
    Event(Value),
    /// A request-shaped object whose headers carry trace context.
    Request(http::Request<Vec<u8>>),
    /// An opaque payload that carries no trace context.
    Stream(Vec<u8>),
}

impl InvocationInput {
    /// Resolves a raw payload: valid JSON becomes [`Event`](Self::Event),
    /// anything else stays an opaque [`Stream`](Self::Stream).
    pub fn from_payload(payload: Vec<u8>) -> Self {
        match serde_json::from_slice::<Value>(&payload) {
            Ok(value) => Self::Event(value),
            Err(_) => Self::Stream(payload),
        }
    }

    /// Returns `true` if this input exposes HTTP headers.
    pub fn has_headers(&self) -> bool {
        match self {
            Self::Event(Value::Object(map)) => map.get("headers").is_some_and(Value::is_object),
            Self::Request(_) => true,
            _ => false,
        }
    }

    /// Returns the JSON event, if this input is one.
    pub fn as_event(&self) -> Option<&Value> {
        match self {
            Self::Event(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for InvocationInput {
    fn from(value: Value) -> Self {
        Self::Event(value)
    }
}

impl From<http::Request<Vec<u8>>> for InvocationInput {
    fn from(request: http::Request<Vec<u8>>) -> Self {
        Self::Request(request)
    }
}

impl From<Vec<u8>> for InvocationInput {
    fn from(payload: Vec<u8>) -> Self {
        Self::Stream(payload)
    }
}
