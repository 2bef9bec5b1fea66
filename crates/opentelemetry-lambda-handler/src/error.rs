//! Error types for the Lambda runtime adapter.

use thiserror::Error;

/// Errors raised by the runtime adapter itself, as opposed to errors
/// returned by the wrapped handler.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The handler wrote a response that is not valid JSON.
    #[error("handler output is not valid JSON")]
    InvalidOutput(#[source] serde_json::Error),
}
