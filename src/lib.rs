//! # toolstep
//!
//! A tool-calling agent loop with a hard step budget, optional structured
//! output, and a sandboxed Python execution tool.
//!
//! ## Architecture
//!
//! - **Agent**: keeps a conversation, asks the model for the next step, runs
//!   the tools it requests and stops when it answers or the budget runs out
//! - **LLM client**: the [`llm::LLMClient`] seam the agent talks through
//! - **Tool registry**: named tools bound to an agent, each a schema plus an
//!   async executor
//! - **Sandbox**: runs untrusted Python snippets in a constrained child
//!   process under an import policy and a deadline
//! - **Presets**: ready-made agents described as a prompt plus tool groups
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toolstep::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AgentError> {
//!     let client: Arc<dyn LLMClient> = Arc::new(my_backend());
//!     let mut agent = PresetRegistry::default().build("math_agent", client)?;
//!
//!     let answer = agent.invoke("What is 3.5 squared plus 2?", Vec::new()).await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod messages;
pub mod sandbox;
pub mod tools;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, AgentPreset, PresetRegistry, SessionState};
    pub use crate::config::ToolstepConfig;
    pub use crate::error::{AgentError, AgentErrorKind};
    pub use crate::llm::{Capability, ChatRequest, LLMClient, LLMError, ModelCapabilities, SamplingParams};
    pub use crate::messages::*;
    pub use crate::sandbox::{PythonSandbox, SandboxOutcome, SandboxRequest};
    pub use crate::tools::{function_tool, BuiltinTools, Tool, ToolError, ToolGroup, ToolRegistry};
    pub use crate::types::SessionId;
}
