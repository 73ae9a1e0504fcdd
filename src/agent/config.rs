//! Agent configuration.
//!
//! Defines configuration options for creating and customizing agents.

use crate::llm::SamplingParams;
use serde::{Deserialize, Serialize};

/// Default number of tool rounds per invocation.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Configuration for creating a new agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Optional display name for the agent, used in logs
    pub name: Option<String>,
    /// The system prompt; empty for none
    pub system_prompt: String,
    /// Maximum number of tool rounds per invocation
    pub max_steps: usize,
    /// Sampling parameters sent with every request
    pub sampling: SamplingParams,
    /// Log tool arguments at info level
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: None,
            system_prompt: String::new(),
            max_steps: DEFAULT_MAX_STEPS,
            sampling: SamplingParams::default(),
            verbose: false,
        }
    }
}

impl AgentConfig {
    /// Creates a new agent configuration with the given system prompt.
    ///
    /// # Examples
    ///
    /// ```
    /// use toolstep::agent::AgentConfig;
    ///
    /// let config = AgentConfig::new("You are a helpful assistant.");
    /// assert_eq!(config.max_steps, 10);
    /// ```
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    /// Sets a display name for the agent.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the round budget.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the sampling parameters.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Enables or disables verbose tool logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the name used in logs.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("agent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = AgentConfig::new("Be brief.")
            .with_name("math")
            .with_max_steps(3)
            .with_verbose(true)
            .with_sampling(SamplingParams::new().with_temperature(0.0));

        assert_eq!(config.system_prompt, "Be brief.");
        assert_eq!(config.display_name(), "math");
        assert_eq!(config.max_steps, 3);
        assert!(config.verbose);
        assert_eq!(config.sampling.temperature, Some(0.0));
    }

    #[test]
    fn unnamed_agents_log_as_agent() {
        assert_eq!(AgentConfig::default().display_name(), "agent");
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"max_steps": 4}"#).unwrap();
        assert_eq!(config.max_steps, 4);
        assert!(config.system_prompt.is_empty());
        assert!(!config.verbose);
    }
}
