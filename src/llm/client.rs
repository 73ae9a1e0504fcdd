//! Model backend trait abstraction.
//!
//! This module defines the `LLMClient` trait which abstracts over chat
//! completion providers, so the agent loop can drive any backend.

use crate::llm::config::SamplingParams;
use crate::llm::error::LLMError;
use crate::messages::{Message, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One chat completion request.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// The full conversation so far
    pub messages: &'a [Message],
    /// Tools the model may call
    pub tools: Option<&'a [ToolDefinition]>,
    /// JSON Schema the answer must conform to
    pub format: Option<&'a serde_json::Value>,
    /// Sampling parameters
    pub sampling: &'a SamplingParams,
}

/// A feature a bound model may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Emitting tool calls
    Tools,
    /// Accepting image input
    Vision,
    /// Producing an extended reasoning trace
    Thinking,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tools => write!(f, "tool calling"),
            Self::Vision => write!(f, "vision input"),
            Self::Thinking => write!(f, "extended reasoning"),
        }
    }
}

/// What the bound model advertises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCapabilities {
    /// Supports tool calls
    pub tools: bool,
    /// Supports image input
    pub vision: bool,
    /// Supports extended reasoning
    pub thinking: bool,
}

impl ModelCapabilities {
    /// A model that supports tool calls and nothing else.
    #[must_use]
    pub fn tools_only() -> Self {
        Self {
            tools: true,
            ..Self::default()
        }
    }

    /// A model that supports everything.
    #[must_use]
    pub fn all() -> Self {
        Self {
            tools: true,
            vision: true,
            thinking: true,
        }
    }

    /// Returns whether the given capability is advertised.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Tools => self.tools,
            Capability::Vision => self.vision,
            Capability::Thinking => self.thinking,
        }
    }
}

/// Trait for chat completion backends.
///
/// Implementations own transport, authentication and model selection. The
/// agent loop only needs one assistant message per request.
///
/// # Example
///
/// ```ignore
/// use toolstep::llm::{ChatRequest, LLMClient, SamplingParams};
///
/// let sampling = SamplingParams::default();
/// let request = ChatRequest {
///     messages: &history,
///     tools: None,
///     format: None,
///     sampling: &sampling,
/// };
/// let reply = client.chat(request).await?;
/// ```
#[async_trait]
pub trait LLMClient: Send + Sync + fmt::Debug {
    /// Sends one chat completion request and returns the assistant message.
    ///
    /// The returned message may carry text, tool calls and a reasoning trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce a response.
    async fn chat(&self, request: ChatRequest<'_>) -> Result<Message, LLMError>;

    /// Returns the capabilities of the bound model.
    fn capabilities(&self) -> ModelCapabilities;

    /// Returns the name of the bound model for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_default_to_none() {
        let caps = ModelCapabilities::default();
        assert!(!caps.supports(Capability::Tools));
        assert!(!caps.supports(Capability::Vision));
        assert!(!caps.supports(Capability::Thinking));
    }

    #[test]
    fn tools_only_supports_tools() {
        let caps = ModelCapabilities::tools_only();
        assert!(caps.supports(Capability::Tools));
        assert!(!caps.supports(Capability::Vision));
    }

    #[test]
    fn capability_display_is_human_readable() {
        assert_eq!(Capability::Tools.to_string(), "tool calling");
        assert_eq!(Capability::Vision.to_string(), "vision input");
        assert_eq!(Capability::Thinking.to_string(), "extended reasoning");
    }

    #[test]
    fn capabilities_parse_from_partial_json() {
        let caps: ModelCapabilities = serde_json::from_str(r#"{"vision": true}"#).unwrap();
        assert!(caps.vision);
        assert!(!caps.tools);
    }
}
