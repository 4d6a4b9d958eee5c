use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Reasons an inbound webhook is rejected before dispatch.
///
/// None of these are surfaced to the caller; the handler logs them at warning
/// level and ends the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing event type header")]
    MissingEventHeader,

    #[error("Unsupported event type: {0}")]
    UnsupportedEvent(String),

    #[error("Missing signature header")]
    MissingSignature,

    #[error("Signature does not match payload")]
    InvalidSignature,

    #[error("Missing or incorrect bearer token")]
    Unauthorized,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// A message template could not be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to render template '{template}': {message}")]
pub struct RenderError {
    pub template: String,
    pub message: String,
}

/// A delivery sink failed to accept a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink's connection has shut down.
    #[error("Sink connection is closed")]
    Closed,

    /// The remote service refused the message.
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// The request did not reach the remote service or the response could
    /// not be read.
    #[error("Transport error: {0}")]
    Transport(String),
}
