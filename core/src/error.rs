//! Error types for the Andon client.
//!
//! # Design
//! The server reports failures in two shapes: its own `errorType` /
//! `errorMessage` envelope, and the web framework's generic `status` /
//! `message` body. Both are folded into one flat enum so callers can match
//! exhaustively on the kind of failure. `App` is the catch-all for error types
//! the client does not recognize and for bodies that carry neither shape.
//!
//! Transport failures are kept out of the taxonomy: they surface as
//! `Transport` wrapping whatever error the transport produced.

/// Error produced by a `Transport` when the round-trip itself fails.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `AndonClient`.
#[derive(Debug, thiserror::Error)]
pub enum AndonError {
    /// A required argument was missing or empty. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server rejected the request as malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// One or more request fields failed validation on the server.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The referenced line or station does not exist.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Authentication or authorization failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server failed while handling the request.
    #[error("internal error: {0}")]
    InternalError(String),

    /// Any other failed request: unknown error types, or a body that could not
    /// be classified (the message then reads `Status {code}: {body}`).
    #[error("andon request failed: {0}")]
    App(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before a response was received.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),
}

impl AndonError {
    /// The message carried by a classified or argument error.
    ///
    /// Returns `None` for `Serialization` and `Transport`.
    pub fn message(&self) -> Option<&str> {
        match self {
            AndonError::InvalidArgument(msg)
            | AndonError::BadRequest(msg)
            | AndonError::InvalidRequest(msg)
            | AndonError::ResourceNotFound(msg)
            | AndonError::Unauthorized(msg)
            | AndonError::InternalError(msg)
            | AndonError::App(msg) => Some(msg),
            AndonError::Serialization(_) | AndonError::Transport(_) => None,
        }
    }

    /// True when the error was classified from a non-2xx server response.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AndonError::BadRequest(_)
                | AndonError::InvalidRequest(_)
                | AndonError::ResourceNotFound(_)
                | AndonError::Unauthorized(_)
                | AndonError::InternalError(_)
                | AndonError::App(_)
        )
    }

    /// Short name of the variant, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            AndonError::InvalidArgument(_) => "invalid_argument",
            AndonError::BadRequest(_) => "bad_request",
            AndonError::InvalidRequest(_) => "invalid_request",
            AndonError::ResourceNotFound(_) => "resource_not_found",
            AndonError::Unauthorized(_) => "unauthorized",
            AndonError::InternalError(_) => "internal_error",
            AndonError::App(_) => "app",
            AndonError::Serialization(_) => "serialization",
            AndonError::Transport(_) => "transport",
        }
    }
}
