//! The tool-calling loop.
//!
//! An [`Agent`] owns one conversation. Each [`Agent::invoke`] appends the
//! prompt, then alternates between a backend call and the execution of the
//! tool calls it returned, until the model answers without tools or the
//! round budget runs out.

use crate::agent::config::AgentConfig;
use crate::agent::state::SessionState;
use crate::error::AgentError;
use crate::llm::{Capability, ChatRequest, LLMClient};
use crate::messages::{Image, Message, ToolCall, ToolDefinition};
use crate::tools::{Tool, ToolRegistry};
use crate::types::SessionId;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Instruction appended before the structured-output call.
const STRUCTURED_INSTRUCTION: &str = "Give your final answer now as a single JSON value that \
conforms to the provided schema. Reply with the JSON only.";

/// A language-model agent with bound tools and a persistent history.
#[derive(Debug)]
pub struct Agent {
    id: SessionId,
    config: AgentConfig,
    client: Arc<dyn LLMClient>,
    tools: ToolRegistry,
    history: Vec<Message>,
    state: SessionState,
}

impl Agent {
    /// Creates an agent over `client`.
    ///
    /// The history starts with the system prompt, if the config has one.
    #[must_use]
    pub fn new(client: Arc<dyn LLMClient>, config: AgentConfig) -> Self {
        let mut agent = Self {
            id: SessionId::new(),
            config,
            client,
            tools: ToolRegistry::new(),
            history: Vec::new(),
            state: SessionState::Idle,
        };
        agent.reset();
        agent
    }

    /// Returns the session ID used in logs.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns where the agent is in its loop.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the bound tools.
    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Returns the conversation so far.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    /// Clears the history back to the system prompt.
    pub fn reset(&mut self) {
        self.history.clear();
        if !self.config.system_prompt.is_empty() {
            self.history
                .push(Message::system(self.config.system_prompt.clone()));
        }
        self.state = SessionState::Idle;
    }

    /// Binds tools. A tool whose name is already bound replaces it.
    ///
    /// # Errors
    ///
    /// Returns a capability error if the model cannot call tools.
    pub fn bind(&mut self, tools: impl IntoIterator<Item = Tool>) -> Result<(), AgentError> {
        let tools: Vec<Tool> = tools.into_iter().collect();
        if tools.is_empty() {
            return Ok(());
        }
        self.require(Capability::Tools)?;

        let replaced = self.tools.bind(tools);
        if !replaced.is_empty() {
            tracing::debug!(
                session_id = %self.id,
                replaced = ?replaced.iter().map(Tool::name).collect::<Vec<_>>(),
                "Rebound tools replaced earlier handlers"
            );
        }
        tracing::debug!(
            session_id = %self.id,
            tools = ?self.tools.names(),
            "Tools bound"
        );
        Ok(())
    }

    /// Builder form of [`Agent::bind`].
    ///
    /// # Errors
    ///
    /// Returns a capability error if the model cannot call tools.
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Result<Self, AgentError> {
        self.bind(tools)?;
        Ok(self)
    }

    /// Sends a prompt and runs the tool loop until the model answers.
    ///
    /// # Errors
    ///
    /// - a capability error if images or thinking are requested but unsupported
    /// - [`StepBudgetExceeded`](crate::error::AgentErrorKind::StepBudgetExceeded)
    ///   if the model still wants tools after `max_steps` rounds
    /// - a backend or tool handler error
    pub async fn invoke(
        &mut self,
        prompt: impl Into<String>,
        images: Vec<Image>,
    ) -> Result<String, AgentError> {
        let result = self.run(prompt.into(), images).await;
        self.finish(result)
    }

    /// Like [`Agent::invoke`], then asks for a final answer conforming to
    /// the JSON Schema of `T` and parses it.
    ///
    /// # Errors
    ///
    /// As [`Agent::invoke`], plus a schema validation error if the answer
    /// does not parse as `T`.
    pub async fn invoke_structured<T>(
        &mut self,
        prompt: impl Into<String>,
        images: Vec<Image>,
    ) -> Result<T, AgentError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let schema = schemars::schema_for!(T).to_value();
        let result = match self.run(prompt.into(), images).await {
            Ok(_) => self.finalize_structured(&schema).await,
            Err(e) => Err(e),
        };
        let raw = self.finish(result)?;

        serde_json::from_str::<T>(raw.trim()).map_err(|e| {
            self.state = SessionState::Failed;
            tracing::warn!(session_id = %self.id, error = %e, "Structured answer rejected");
            AgentError::schema_validation(e.to_string(), raw)
        })
    }

    fn finish(&mut self, result: Result<String, AgentError>) -> Result<String, AgentError> {
        self.state = match &result {
            Ok(_) => SessionState::Completed,
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Invocation failed");
                SessionState::Failed
            }
        };
        result
    }

    fn require(&self, capability: Capability) -> Result<(), AgentError> {
        if self.client.capabilities().supports(capability) {
            Ok(())
        } else {
            Err(AgentError::capability(capability, self.client.model_name()))
        }
    }

    async fn run(&mut self, prompt: String, images: Vec<Image>) -> Result<String, AgentError> {
        if !images.is_empty() {
            self.require(Capability::Vision)?;
        }
        if self.config.sampling.think {
            self.require(Capability::Thinking)?;
        }

        tracing::info!(
            session_id = %self.id,
            agent = %self.config.display_name(),
            model = %self.client.model_name(),
            images = images.len(),
            "Invocation started"
        );
        self.history.push(if images.is_empty() {
            Message::user(prompt)
        } else {
            Message::user_with_images(prompt, images)
        });

        let definitions = self.tools.definitions();
        let mut steps = 0;
        loop {
            self.state = SessionState::AwaitingModel;
            let reply = self.chat(&definitions, None).await?;
            let calls = reply.tool_calls.clone();
            self.history.push(reply);

            if calls.is_empty() {
                break;
            }
            if steps == self.config.max_steps {
                return Err(AgentError::step_budget_exceeded(self.config.max_steps));
            }

            steps += 1;
            self.state = SessionState::ExecutingTools;
            tracing::info!(
                session_id = %self.id,
                round = steps,
                max_steps = self.config.max_steps,
                calls = calls.len(),
                "Executing tool round"
            );
            for call in &calls {
                let output = self.execute(call).await?;
                self.history.push(Message::tool(&call.name, output));
            }
        }

        self.state = SessionState::Finalizing;
        tracing::info!(session_id = %self.id, rounds = steps, "Invocation answered");
        Ok(self
            .history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default())
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, AgentError> {
        let Some(tool) = self.tools.resolve(&call.name) else {
            tracing::warn!(session_id = %self.id, tool = %call.name, "Model called an unknown tool");
            return Ok(format!("Function {} not found", call.name));
        };

        if self.config.verbose {
            tracing::info!(session_id = %self.id, tool = %call.name, arguments = ?call.arguments, "Calling tool");
        } else {
            tracing::debug!(session_id = %self.id, tool = %call.name, "Calling tool");
        }

        let output = tool.invoke(&call.arguments).await?;
        tracing::debug!(session_id = %self.id, tool = %call.name, bytes = output.len(), "Tool returned");
        Ok(output)
    }

    async fn finalize_structured(&mut self, schema: &Value) -> Result<String, AgentError> {
        self.state = SessionState::Finalizing;
        self.history.push(Message::user(STRUCTURED_INSTRUCTION));
        let reply = self.chat(&[], Some(schema)).await?;
        let content = reply.content.clone();
        self.history.push(reply);
        Ok(content)
    }

    async fn chat(
        &self,
        definitions: &[ToolDefinition],
        format: Option<&Value>,
    ) -> Result<Message, AgentError> {
        let request = ChatRequest {
            messages: &self.history,
            tools: (!definitions.is_empty()).then_some(definitions),
            format,
            sampling: &self.config.sampling,
        };
        let reply = self.client.chat(request).await?;
        tracing::debug!(
            session_id = %self.id,
            tool_calls = reply.tool_calls.len(),
            has_thinking = reply.thinking.is_some(),
            "Model replied"
        );
        Ok(reply)
    }
}
