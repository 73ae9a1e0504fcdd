//! Conversation data model.
//!
//! Messages, tool calls and tool definitions exchanged between an
//! [`Agent`](crate::agent::Agent), its model backend and its tools.

mod types;

pub use types::{Image, Message, MessageRole, ToolArguments, ToolCall, ToolDefinition};
