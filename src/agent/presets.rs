//! Preset agents as data.
//!
//! A preset is a system prompt plus the tool groups to bind. The registry
//! ships the built-in presets and accepts custom ones.

use crate::agent::config::AgentConfig;
use crate::agent::prompts;
use crate::agent::session::Agent;
use crate::error::AgentError;
use crate::llm::LLMClient;
use crate::tools::{BuiltinTools, ToolGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named agent recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPreset {
    /// System prompt
    pub system_prompt: String,
    /// Tool groups to bind, in order
    #[serde(default)]
    pub tool_groups: Vec<ToolGroup>,
}

impl AgentPreset {
    /// Creates a preset.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, tool_groups: &[ToolGroup]) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            tool_groups: tool_groups.to_vec(),
        }
    }
}

/// Registry of presets by name.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: BTreeMap<String, AgentPreset>,
    builtins: BuiltinTools,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::with_builtins(BuiltinTools::default())
    }
}

impl PresetRegistry {
    /// Creates a registry holding the built-in presets, whose coding tools
    /// come from `builtins`.
    #[must_use]
    pub fn with_builtins(builtins: BuiltinTools) -> Self {
        use ToolGroup::{Coding, File, Math};

        let mut registry = Self {
            presets: BTreeMap::new(),
            builtins,
        };
        registry.register("assistant", AgentPreset::new(prompts::ASSISTANT_PROMPT, &[]));
        registry.register("agent", AgentPreset::new(prompts::AGENT_PROMPT, &[]));
        registry.register("math_agent", AgentPreset::new(prompts::MATH_AGENT_PROMPT, &[Math]));
        registry.register("react_agent", AgentPreset::new(prompts::REACT_AGENT_PROMPT, &[File]));
        registry.register(
            "writing_agent",
            AgentPreset::new(prompts::WRITING_AGENT_PROMPT, &[File]),
        );
        registry.register(
            "coding_agent",
            AgentPreset::new(prompts::CODING_AGENT_PROMPT, &[File, Coding]),
        );
        registry
    }

    /// Adds or replaces a preset.
    pub fn register(&mut self, name: impl Into<String>, preset: AgentPreset) -> Option<AgentPreset> {
        self.presets.insert(name.into(), preset)
    }

    /// Looks up a preset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AgentPreset> {
        self.presets.get(name)
    }

    /// Lists preset names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Builds an agent from a preset with default settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown name, or a capability
    /// error if the preset has tools and the model cannot call them.
    pub fn build(&self, name: &str, client: Arc<dyn LLMClient>) -> Result<Agent, AgentError> {
        self.build_with(name, client, AgentConfig::default())
    }

    /// Builds an agent from a preset, taking everything but the system prompt
    /// from `config`.
    ///
    /// # Errors
    ///
    /// As [`PresetRegistry::build`].
    pub fn build_with(
        &self,
        name: &str,
        client: Arc<dyn LLMClient>,
        config: AgentConfig,
    ) -> Result<Agent, AgentError> {
        let preset = self.get(name).ok_or_else(|| {
            AgentError::configuration(format!(
                "unknown preset '{}'; available presets: {}",
                name,
                self.names().join(", ")
            ))
        })?;

        let config = AgentConfig {
            name: config.name.or_else(|| Some(name.to_string())),
            system_prompt: preset.system_prompt.clone(),
            ..config
        };
        tracing::debug!(preset = name, groups = ?preset.tool_groups, "Building preset agent");
        Agent::new(client, config).with_tools(self.builtins.groups(&preset.tool_groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ModelCapabilities, ScriptedClient};

    fn client(caps: ModelCapabilities) -> Arc<dyn LLMClient> {
        Arc::new(ScriptedClient::new(caps))
    }

    #[test]
    fn builtin_presets_are_registered() {
        let registry = PresetRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["agent", "assistant", "coding_agent", "math_agent", "react_agent", "writing_agent"]
        );
    }

    #[test]
    fn presets_bind_their_groups() {
        let registry = PresetRegistry::default();
        let caps = ModelCapabilities::tools_only();

        let math = registry.build("math_agent", client(caps)).unwrap();
        assert_eq!(math.tools().len(), 11);
        assert_eq!(math.config().display_name(), "math_agent");

        let coding = registry.build("coding_agent", client(caps)).unwrap();
        assert!(coding.tools().contains("python_run"));
        assert!(coding.tools().contains("read_file"));
        assert_eq!(coding.tools().len(), 7);

        let writer = registry.build("writing_agent", client(caps)).unwrap();
        assert!(!writer.tools().contains("python_run"));
    }

    #[test]
    fn system_prompt_comes_from_the_preset() {
        let agent = PresetRegistry::default()
            .build_with(
                "assistant",
                client(ModelCapabilities::default()),
                AgentConfig::new("ignored").with_max_steps(2),
            )
            .unwrap();
        assert_eq!(agent.messages()[0].content, prompts::ASSISTANT_PROMPT);
        assert_eq!(agent.config().max_steps, 2);
        assert!(agent.tools().is_empty());
    }

    #[test]
    fn tool_presets_need_tool_capable_models() {
        let err = PresetRegistry::default()
            .build("react_agent", client(ModelCapabilities::default()))
            .unwrap_err();
        assert!(err.is_capability());
    }

    #[test]
    fn unknown_preset_is_a_configuration_error() {
        let err = PresetRegistry::default()
            .build("wizard", client(ModelCapabilities::all()))
            .unwrap_err();
        assert!(err.to_string().contains("unknown preset 'wizard'"));
    }

    #[test]
    fn custom_presets_can_be_added() {
        let mut registry = PresetRegistry::default();
        registry.register(
            "calculator",
            AgentPreset::new("Only compute.", &[ToolGroup::Math, ToolGroup::Coding]),
        );
        let agent = registry
            .build("calculator", client(ModelCapabilities::tools_only()))
            .unwrap();
        assert_eq!(agent.tools().len(), 12);
    }
}
