//! Session state enumeration.
//!
//! Tracks where an agent is in its invoke loop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The current state of an agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// Waiting for a prompt
    #[default]
    Idle,
    /// A backend call is in flight
    AwaitingModel,
    /// Running the tool calls of one round
    ExecutingTools,
    /// Producing the final or structured answer
    Finalizing,
    /// The last invocation returned an answer
    Completed,
    /// The last invocation ended with an error
    Failed,
}

impl SessionState {
    /// Returns true if the agent can accept a new prompt in this state.
    #[must_use]
    pub fn can_accept_prompt(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }

    /// Returns true while an invocation is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::AwaitingModel | Self::ExecutingTools | Self::Finalizing
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingModel => write!(f, "awaiting_model"),
            Self::ExecutingTools => write!(f, "executing_tools"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn terminal_states_accept_prompts() {
        assert!(SessionState::Idle.can_accept_prompt());
        assert!(SessionState::Completed.can_accept_prompt());
        assert!(SessionState::Failed.can_accept_prompt());
        assert!(!SessionState::ExecutingTools.can_accept_prompt());
    }

    #[test]
    fn active_states() {
        assert!(SessionState::AwaitingModel.is_active());
        assert!(SessionState::Finalizing.is_active());
        assert!(!SessionState::Completed.is_active());
    }

    #[test]
    fn display() {
        assert_eq!(SessionState::ExecutingTools.to_string(), "executing_tools");
    }
}
