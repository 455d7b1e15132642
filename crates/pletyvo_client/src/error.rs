//! Client error types.

use pletyvo_core::CoreError;

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the event log
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Transport failed to deliver the request or the reply
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server replied with something that is not the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Envelope could not be built
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Create a transport error
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Create an invalid response error
    #[must_use]
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }
}
