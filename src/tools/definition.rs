//! Tool descriptors and the executor trait.
//!
//! A [`Tool`] pairs the [`ToolDefinition`] advertised to the model with the
//! executor that runs it. Executors receive the call's arguments as one JSON
//! object and deserialize it by parameter name.

use crate::messages::{ToolArguments, ToolDefinition};
use crate::tools::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The result type for tool execution futures.
pub type ToolExecutionFuture =
    Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'static>>;

/// Trait for executing tools.
///
/// # Example
///
/// ```rust
/// use toolstep::tools::{ToolExecutorTrait, ToolError, ToolExecutionFuture};
/// use serde_json::Value;
///
/// #[derive(Debug)]
/// struct EchoTool;
///
/// impl ToolExecutorTrait for EchoTool {
///     fn execute(&self, args: Value) -> ToolExecutionFuture {
///         Box::pin(async move { Ok(args) })
///     }
/// }
/// ```
pub trait ToolExecutorTrait: Send + Sync + Debug {
    /// Executes the tool with the given arguments object.
    ///
    /// Returning `Err` aborts the whole agent invocation. Failures the model
    /// could recover from should be returned as `Ok` text instead.
    fn execute(&self, args: Value) -> ToolExecutionFuture;

    /// Validates the arguments before execution.
    ///
    /// The default implementation accepts any arguments.
    fn validate_args(&self, _args: &Value) -> Result<(), ToolError> {
        Ok(())
    }
}

/// A boxed tool executor for dynamic dispatch.
pub type BoxedToolExecutor = Box<dyn ToolExecutorTrait>;

/// A bindable tool: what the model sees plus what runs.
#[derive(Debug, Clone)]
pub struct Tool {
    /// The definition advertised to the model
    pub definition: ToolDefinition,
    /// The executor (shared so registries can be cloned)
    pub executor: Arc<BoxedToolExecutor>,
}

impl Tool {
    /// Creates a tool from a definition and an executor.
    #[must_use]
    pub fn new(definition: ToolDefinition, executor: impl ToolExecutorTrait + 'static) -> Self {
        Self {
            definition,
            executor: Arc::new(Box::new(executor)),
        }
    }

    /// Returns the tool's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Validates and runs the tool, returning its output as text.
    ///
    /// JSON strings are returned without quotes; any other value is returned
    /// as compact JSON.
    ///
    /// # Errors
    ///
    /// Propagates the executor's validation or execution error.
    pub async fn invoke(&self, arguments: &ToolArguments) -> Result<String, ToolError> {
        let args = Value::Object(arguments.clone());
        self.executor.validate_args(&args)?;
        let output = self.executor.execute(args).await?;
        Ok(stringify(output))
    }
}

/// Renders a tool's return value for the conversation history.
#[must_use]
pub fn stringify(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Deserializes a tool's arguments object into its parameter struct.
///
/// # Errors
///
/// Returns a validation error naming the tool when the arguments do not match.
pub fn parse_args<T: DeserializeOwned>(tool_name: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation_failed(tool_name, format!("invalid arguments: {e}")))
}

type ToolFn = dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync;

/// An executor backed by a synchronous closure.
#[derive(Clone)]
pub struct FnTool {
    name: String,
    f: Arc<ToolFn>,
}

impl Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish_non_exhaustive()
    }
}

impl ToolExecutorTrait for FnTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        let result = (self.f)(args);
        Box::pin(async move { result })
    }
}

/// Builds a tool from a closure.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use toolstep::tools::function_tool;
///
/// let to_f = function_tool(
///     "celsius_to_fahrenheit",
///     "Convert Celsius to Fahrenheit.",
///     json!({"type": "object", "properties": {"celsius": {"type": "number"}}, "required": ["celsius"]}),
///     |args| {
///         let c = args["celsius"].as_f64().unwrap_or_default();
///         Ok(json!(c * 9.0 / 5.0 + 32.0))
///     },
/// );
/// assert_eq!(to_f.name(), "celsius_to_fahrenheit");
/// ```
pub fn function_tool<F>(
    name: impl Into<String>,
    description: impl Into<String>,
    input_schema: Value,
    f: F,
) -> Tool
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
{
    let name = name.into();
    Tool::new(
        ToolDefinition {
            name: name.clone(),
            description: description.into(),
            input_schema,
        },
        FnTool {
            name,
            f: Arc::new(f),
        },
    )
}
