//! Agent error types.
//!
//! Errors that abort an invocation. Recoverable problems (an unknown tool
//! name, a sandbox failure, a domain error inside a tool) never surface here;
//! they are written into the conversation as text and the loop continues.
//!
//! No external error crates (anyhow, thiserror, eyre) are used.

use crate::llm::{Capability, LLMError};
use crate::tools::ToolError;
use std::fmt;

/// Errors that can end an agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    /// The specific error that occurred
    pub kind: AgentErrorKind,
}

/// Specific agent error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentErrorKind {
    /// The bound model lacks a feature the call needs
    Capability {
        /// The missing capability
        capability: Capability,
        /// The model that lacks it
        model: String,
    },
    /// The model still wanted tools when the round budget ran out
    StepBudgetExceeded {
        /// The configured budget
        max_steps: usize,
    },
    /// The final structured answer did not match the requested schema
    SchemaValidation {
        /// Why parsing failed
        reason: String,
        /// The text the model produced
        raw: String,
    },
    /// The model backend failed
    Backend(LLMError),
    /// A tool handler failed
    Tool(ToolError),
    /// Invalid configuration or unknown preset
    Configuration {
        /// What was wrong
        reason: String,
    },
}

impl AgentError {
    /// Creates a new AgentError with the given kind.
    #[must_use]
    pub fn new(kind: AgentErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a capability error.
    #[must_use]
    pub fn capability(capability: Capability, model: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Capability {
            capability,
            model: model.into(),
        })
    }

    /// Creates a step budget exceeded error.
    #[must_use]
    pub fn step_budget_exceeded(max_steps: usize) -> Self {
        Self::new(AgentErrorKind::StepBudgetExceeded { max_steps })
    }

    /// Creates a schema validation error.
    #[must_use]
    pub fn schema_validation(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::SchemaValidation {
            reason: reason.into(),
            raw: raw.into(),
        })
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Configuration {
            reason: reason.into(),
        })
    }

    /// Returns true if the bound model lacks a needed capability.
    #[must_use]
    pub fn is_capability(&self) -> bool {
        matches!(self.kind, AgentErrorKind::Capability { .. })
    }

    /// Returns true if the round budget ran out.
    #[must_use]
    pub fn is_step_budget_exceeded(&self) -> bool {
        matches!(self.kind, AgentErrorKind::StepBudgetExceeded { .. })
    }

    /// Returns true if the structured answer was invalid.
    #[must_use]
    pub fn is_schema_validation(&self) -> bool {
        matches!(self.kind, AgentErrorKind::SchemaValidation { .. })
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AgentErrorKind::Capability { capability, model } => {
                write!(
                    f,
                    "model '{}' does not support {}; bind a model that does",
                    model, capability
                )
            }
            AgentErrorKind::StepBudgetExceeded { max_steps } => {
                write!(
                    f,
                    "step budget of {} rounds exhausted while the model still requested tools; \
                     raise max_steps or simplify the task",
                    max_steps
                )
            }
            AgentErrorKind::SchemaValidation { reason, .. } => {
                write!(f, "structured answer does not match the schema: {}", reason)
            }
            AgentErrorKind::Backend(e) => write!(f, "model backend error: {}", e),
            AgentErrorKind::Tool(e) => write!(f, "tool handler failed: {}", e),
            AgentErrorKind::Configuration { reason } => {
                write!(f, "invalid agent configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AgentErrorKind::Backend(e) => Some(e),
            AgentErrorKind::Tool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LLMError> for AgentError {
    fn from(e: LLMError) -> Self {
        Self::new(AgentErrorKind::Backend(e))
    }
}

impl From<ToolError> for AgentError {
    fn from(e: ToolError) -> Self {
        Self::new(AgentErrorKind::Tool(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn capability_display_names_model_and_feature() {
        let error = AgentError::capability(Capability::Vision, "tiny-text");
        let message = error.to_string();
        assert!(message.contains("tiny-text"));
        assert!(message.contains("vision input"));
        assert!(error.is_capability());
    }

    #[test]
    fn step_budget_display() {
        let error = AgentError::step_budget_exceeded(3);
        assert!(error.to_string().contains("3 rounds"));
        assert!(error.is_step_budget_exceeded());
        assert!(!error.is_capability());
    }

    #[test]
    fn schema_validation_keeps_raw_text() {
        let error = AgentError::schema_validation("missing field `city`", "{}");
        assert!(error.is_schema_validation());
        assert!(matches!(&error.kind, AgentErrorKind::SchemaValidation { raw, .. } if raw == "{}"));
    }

    #[test]
    fn conversions_preserve_source() {
        let error: AgentError = LLMError::unavailable("down").into();
        assert!(error.source().is_some());
        assert!(error.to_string().contains("down"));

        let error: AgentError = ToolError::execution_failed("x", "boom").into();
        assert!(matches!(error.kind, AgentErrorKind::Tool(_)));
        assert!(error.source().unwrap().to_string().contains("boom"));
    }
}
