//! Core error types for pletyvo.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
///
/// Every failure is local and synchronous; constructors either return a
/// fully built value or one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Malformed field value: out-of-range octet, wrong length, unsupported
    /// data type or version
    #[error("Validation failed for {field}: {reason}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Malformed base64url text or truncated buffer
    #[error("Decode error: {reason}")]
    Decode {
        /// Decoder message
        reason: String,
    },

    /// Operation is invalid for the current envelope version
    #[error("Invalid state: {reason}")]
    State {
        /// Why the operation was refused
        reason: String,
    },

    /// Reading key material from disk failed
    #[error("I/O error on {path}: {reason}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying error message
        reason: String,
    },
}

impl CoreError {
    /// Build a validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Build a state error
    pub fn state(reason: impl Into<String>) -> Self {
        Self::State {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation("payload", err.to_string())
    }
}
