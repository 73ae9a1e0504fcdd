//! Model backend error types.

use std::fmt;

/// Errors that a model backend can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLMError {
    /// The specific error that occurred
    pub kind: LLMErrorKind,
}

/// Specific backend error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LLMErrorKind {
    /// The backend could not produce a response
    Unavailable {
        /// Description of the failure
        message: String,
    },
    /// The backend answered with something that is not a chat message
    InvalidResponse {
        /// Description of what was wrong
        message: String,
    },
    /// The request was rejected before it was sent
    InvalidRequest {
        /// Description of what was invalid
        reason: String,
    },
    /// A scripted backend ran out of queued responses
    ScriptExhausted {
        /// Number of calls answered before running dry
        answered: usize,
    },
}

impl LLMError {
    /// Creates a new LLMError with the given kind.
    #[must_use]
    pub fn new(kind: LLMErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::Unavailable {
            message: message.into(),
        })
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidResponse {
            message: message.into(),
        })
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidRequest {
            reason: reason.into(),
        })
    }

    /// Creates a script exhausted error.
    #[must_use]
    pub fn script_exhausted(answered: usize) -> Self {
        Self::new(LLMErrorKind::ScriptExhausted { answered })
    }

    /// Returns true if retrying the same request could succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, LLMErrorKind::Unavailable { .. })
    }
}

impl fmt::Display for LLMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LLMErrorKind::Unavailable { message } => {
                write!(f, "model backend unavailable: {}", message)
            }
            LLMErrorKind::InvalidResponse { message } => {
                write!(f, "model backend returned an invalid response: {}", message)
            }
            LLMErrorKind::InvalidRequest { reason } => {
                write!(f, "invalid request: {}; check request parameters", reason)
            }
            LLMErrorKind::ScriptExhausted { answered } => {
                write!(
                    f,
                    "scripted backend has no response left after {} calls; queue more responses",
                    answered
                )
            }
        }
    }
}

impl std::error::Error for LLMError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display() {
        let error = LLMError::unavailable("connection refused");
        let message = error.to_string();
        assert!(message.contains("unavailable"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn script_exhausted_display_mentions_count() {
        let error = LLMError::script_exhausted(3);
        assert!(error.to_string().contains("after 3 calls"));
    }

    #[test]
    fn only_unavailable_is_retriable() {
        assert!(LLMError::unavailable("x").is_retriable());
        assert!(!LLMError::invalid_response("x").is_retriable());
        assert!(!LLMError::invalid_request("x").is_retriable());
        assert!(!LLMError::script_exhausted(0).is_retriable());
    }
}
