//! Per-agent tool registry.
//!
//! The registry maps tool names to bound [`Tool`]s and keeps the order in
//! which names were first registered, so the definitions advertised to the
//! model are stable across rebinding.

use crate::messages::ToolDefinition;
use crate::tools::definition::Tool;
use std::collections::HashMap;

/// The set of tools bound to one agent.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Registered tools in first-registration order
    tools: Vec<Tool>,
    /// Tool name to position in `tools`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// A tool with the same name is replaced in place and returned.
    pub fn register(&mut self, tool: Tool) -> Option<Tool> {
        match self.index.get(tool.name()) {
            Some(&position) => {
                tracing::debug!(tool_name = %tool.name(), "Replacing bound tool");
                Some(std::mem::replace(&mut self.tools[position], tool))
            }
            None => {
                tracing::debug!(tool_name = %tool.name(), "Registering tool");
                self.index.insert(tool.name().to_string(), self.tools.len());
                self.tools.push(tool);
                None
            }
        }
    }

    /// Registers every tool in order. Later names win.
    ///
    /// Returns the tools that were replaced.
    pub fn bind(&mut self, tools: impl IntoIterator<Item = Tool>) -> Vec<Tool> {
        tools
            .into_iter()
            .filter_map(|tool| self.register(tool))
            .collect()
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    /// Returns the definitions to advertise to the model.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition.clone()).collect()
    }

    /// Returns the registered names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    /// Checks if a tool is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
