//! Tool error types.
//!
//! A `ToolError` returned by a handler aborts the agent invocation. Handlers
//! report recoverable problems (missing files, domain errors) as text instead.

use std::fmt;

/// Errors that can occur in tool operations.
///
/// The kind is boxed to keep `Result<_, ToolError>` small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    kind: Box<ToolErrorKind>,
}

/// Specific tool error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// Tool not found in a registry or tool group
    NotFound {
        /// The name of the tool that was not found
        tool_name: String,
    },
    /// Tool execution failed
    ExecutionFailed {
        /// The name of the tool
        tool_name: String,
        /// Reason for failure
        reason: String,
    },
    /// Arguments did not match the tool's parameters
    ValidationFailed {
        /// The name of the tool
        tool_name: String,
        /// What was invalid
        reason: String,
    },
    /// Internal error
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl ToolError {
    /// Creates a new ToolError with the given kind.
    #[must_use]
    pub fn new(kind: ToolErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound {
            tool_name: tool_name.into(),
        })
    }

    /// Creates an execution failed error.
    #[must_use]
    pub fn execution_failed(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates a validation failed error.
    #[must_use]
    pub fn validation_failed(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ValidationFailed {
            tool_name: tool_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal {
            message: message.into(),
        })
    }

    /// Returns true if this error indicates the tool was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::NotFound { .. })
    }

    /// Returns true if the arguments were rejected.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::ValidationFailed { .. })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            ToolErrorKind::NotFound { tool_name } => {
                write!(
                    f,
                    "tool '{}' not found; verify the tool name is spelled correctly",
                    tool_name
                )
            }
            ToolErrorKind::ExecutionFailed { tool_name, reason } => {
                write!(f, "tool '{}' execution failed: {}", tool_name, reason)
            }
            ToolErrorKind::ValidationFailed { tool_name, reason } => {
                write!(
                    f,
                    "tool '{}' validation failed: {}; check the input arguments",
                    tool_name, reason
                )
            }
            ToolErrorKind::Internal { message } => {
                write!(f, "internal tool error: {}", message)
            }
        }
    }
}

impl std::error::Error for ToolError {}
