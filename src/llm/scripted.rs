//! Deterministic backend that replays queued responses.
//!
//! Useful for tests and offline runs: every `chat` call pops the next queued
//! assistant message and records what it was asked.

use crate::llm::client::{ChatRequest, LLMClient, ModelCapabilities};
use crate::llm::config::SamplingParams;
use crate::llm::error::LLMError;
use crate::messages::{Message, ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An owned copy of a request seen by [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// The history that was sent
    pub messages: Vec<Message>,
    /// The tool definitions that were sent
    pub tools: Option<Vec<ToolDefinition>>,
    /// The structured output schema, if any
    pub format: Option<serde_json::Value>,
    /// The sampling parameters
    pub sampling: SamplingParams,
}

/// A backend that answers from a queue of prepared assistant messages.
#[derive(Debug)]
pub struct ScriptedClient {
    model: String,
    capabilities: ModelCapabilities,
    responses: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedClient {
    /// Creates an empty script with the given capabilities.
    #[must_use]
    pub fn new(capabilities: ModelCapabilities) -> Self {
        Self {
            model: "scripted".to_string(),
            capabilities,
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sets the model name reported to the agent.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Queues an arbitrary assistant message.
    #[must_use]
    pub fn then(self, message: Message) -> Self {
        self.push(message);
        self
    }

    /// Queues a plain text answer.
    #[must_use]
    pub fn then_text(self, content: impl Into<String>) -> Self {
        self.then(Message::assistant(content))
    }

    /// Queues a round of tool calls.
    #[must_use]
    pub fn then_tools(self, calls: Vec<ToolCall>) -> Self {
        self.then(Message::assistant_with_tools("", calls))
    }

    /// Queues a message on a shared client.
    pub fn push(&self, message: Message) {
        lock(&self.responses).push_back(message);
    }

    /// Returns the number of responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<Message, LLMError> {
        let answered = {
            let mut requests = lock(&self.requests);
            requests.push(RecordedRequest {
                messages: request.messages.to_vec(),
                tools: request.tools.map(<[ToolDefinition]>::to_vec),
                format: request.format.cloned(),
                sampling: request.sampling.clone(),
            });
            requests.len() - 1
        };

        lock(&self.responses)
            .pop_front()
            .ok_or_else(|| LLMError::script_exhausted(answered))
    }

    fn capabilities(&self) -> ModelCapabilities {
        self.capabilities
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMErrorKind;

    #[tokio::test]
    async fn replays_in_order_and_records_requests() {
        let client = ScriptedClient::new(ModelCapabilities::tools_only())
            .then_text("first")
            .then_text("second");
        let history = vec![Message::user("hi")];
        let sampling = SamplingParams::default().with_temperature(0.1);
        let request = ChatRequest {
            messages: &history,
            tools: None,
            format: None,
            sampling: &sampling,
        };

        assert_eq!(client.chat(request).await.unwrap().content, "first");
        assert_eq!(client.chat(request).await.unwrap().content, "second");

        let seen = client.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].messages, history);
        assert_eq!(seen[0].sampling.temperature, Some(0.1));
        assert_eq!(client.remaining(), 0);
    }

    #[tokio::test]
    async fn empty_script_reports_exhaustion() {
        let client = ScriptedClient::new(ModelCapabilities::default());
        let sampling = SamplingParams::default();
        let request = ChatRequest {
            messages: &[],
            tools: None,
            format: None,
            sampling: &sampling,
        };

        let err = client.chat(request).await.unwrap_err();
        assert_eq!(err.kind, LLMErrorKind::ScriptExhausted { answered: 0 });
    }
}
