//! Configuration file types.

use crate::agent::AgentConfig;
use crate::agent::DEFAULT_MAX_STEPS;
use crate::llm::SamplingParams;
use crate::logging::LoggingConfig;
use crate::sandbox::{PythonSandbox, SandboxConfig, MAX_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure for toolstep.
///
/// Maps directly to the TOML file; every section is optional:
///
/// ```toml
/// [agent]
/// max_steps = 6
/// verbose = true
///
/// [sampling]
/// temperature = 0.2
///
/// [sandbox]
/// default_timeout_secs = 2.0
/// extra_denied_imports = ["pickle"]
///
/// [sandbox.policy]
/// approved = ["json", "re"]
///
/// [logging]
/// level = "debug"
/// file = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolstepConfig {
    /// Loop settings applied to every agent
    pub agent: AgentSection,
    /// Sampling parameters sent with every request
    pub sampling: SamplingParams,
    /// Python sandbox settings
    pub sandbox: SandboxConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl ToolstepConfig {
    /// Creates a configuration with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an agent configuration from the `[agent]` and `[sampling]`
    /// sections.
    #[must_use]
    pub fn agent_config(&self, system_prompt: impl Into<String>) -> AgentConfig {
        AgentConfig::new(system_prompt)
            .with_max_steps(self.agent.max_steps)
            .with_verbose(self.agent.verbose)
            .with_sampling(self.sampling.clone())
    }

    /// Builds a sandbox from the `[sandbox]` section and its policy table.
    #[must_use]
    pub fn sandbox(&self) -> PythonSandbox {
        PythonSandbox::new(self.sandbox.clone())
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::invalid_value(
                "agent.max_steps",
                "must be at least 1",
            ));
        }
        let sandbox = &self.sandbox;
        if !(sandbox.default_timeout_secs.is_finite() && sandbox.default_timeout_secs > 0.0) {
            return Err(ConfigError::invalid_value(
                "sandbox.default_timeout_secs",
                "must be a positive number of seconds",
            ));
        }
        if sandbox.max_timeout_secs < sandbox.default_timeout_secs {
            return Err(ConfigError::invalid_value(
                "sandbox.max_timeout_secs",
                "must not be below default_timeout_secs",
            ));
        }
        let max_timeout = sandbox.max_timeout_secs;
        if !max_timeout.is_finite() || max_timeout > MAX_TIMEOUT.as_secs_f64() {
            return Err(ConfigError::invalid_value(
                "sandbox.max_timeout_secs",
                format!("must not exceed {} seconds", MAX_TIMEOUT.as_secs()),
            ));
        }
        if sandbox.interpreter.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "sandbox.interpreter",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// The `[agent]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Maximum number of tool rounds per invocation
    pub max_steps: usize,
    /// Log tool arguments at info level
    pub verbose: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            verbose: false,
        }
    }
}

/// Errors from loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The specific error that occurred
    pub kind: ConfigErrorKind,
}

/// Specific configuration error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The file could not be read
    Read {
        /// Path that was read
        path: String,
        /// The reason for failure
        reason: String,
    },
    /// The content is not valid TOML or does not match the schema
    Parse {
        /// The parser's message
        reason: String,
    },
    /// A field parsed but holds an unusable value
    InvalidValue {
        /// Dotted field name
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Creates a new ConfigError with the given kind.
    #[must_use]
    pub fn new(kind: ConfigErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a read error.
    #[must_use]
    pub fn read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Read {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse {
            reason: reason.into(),
        })
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the file content could not be parsed.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::Parse { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConfigErrorKind::Read { path, reason } => {
                write!(f, "failed to read config file '{}': {}", path, reason)
            }
            ConfigErrorKind::Parse { reason } => write!(f, "invalid config: {}", reason),
            ConfigErrorKind::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = ToolstepConfig::default();
        assert_eq!(config.agent.max_steps, DEFAULT_MAX_STEPS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn agent_config_takes_sections() {
        let mut config = ToolstepConfig::new();
        config.agent.max_steps = 3;
        config.agent.verbose = true;
        config.sampling = SamplingParams::new().with_temperature(0.1);

        let agent = config.agent_config("Be brief.");
        assert_eq!(agent.system_prompt, "Be brief.");
        assert_eq!(agent.max_steps, 3);
        assert!(agent.verbose);
        assert_eq!(agent.sampling.temperature, Some(0.1));
    }

    #[test]
    fn sandbox_uses_section() {
        let mut config = ToolstepConfig::new();
        config.sandbox.default_timeout_secs = 1.5;
        let sandbox = config.sandbox();
        assert_eq!(
            sandbox.config().clamp_timeout(None),
            Duration::from_secs_f64(1.5)
        );
    }

    #[test]
    fn zero_steps_is_invalid() {
        let mut config = ToolstepConfig::new();
        config.agent.max_steps = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent.max_steps"));
    }

    #[test]
    fn max_timeout_below_default_is_invalid() {
        let mut config = ToolstepConfig::new();
        config.sandbox.max_timeout_secs = 0.5;
        assert!(matches!(
            config.validate().unwrap_err().kind,
            ConfigErrorKind::InvalidValue { .. }
        ));
    }
}
