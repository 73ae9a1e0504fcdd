//! Tool system.
//!
//! - **Definitions**: [`Tool`] pairs a [`ToolDefinition`](crate::messages::ToolDefinition)
//!   with a [`ToolExecutorTrait`] implementation
//! - **Registry**: [`ToolRegistry`] holds an agent's bound tools by name
//! - **Built-ins**: math, file and coding groups in [`builtins`]
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use toolstep::tools::{function_tool, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.bind([function_tool(
//!     "weather_condition",
//!     "Look up the weather condition for a city.",
//!     json!({"type": "object", "properties": {"city": {"type": "string"}}}),
//!     |_| Ok(json!("Sunny")),
//! )]);
//! assert!(registry.resolve("weather_condition").is_some());
//! ```

pub mod builtins;
mod definition;
mod error;
mod registry;

pub use builtins::{BuiltinTools, ToolGroup};
pub use definition::{
    function_tool, parse_args, stringify, BoxedToolExecutor, FnTool, Tool, ToolExecutionFuture,
    ToolExecutorTrait,
};
pub use error::{ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
