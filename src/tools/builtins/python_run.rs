//! The `python_run` tool: sandboxed snippet execution.

use crate::messages::ToolDefinition;
use crate::sandbox::{PythonSandbox, SandboxRequest};
use crate::tools::{parse_args, Tool, ToolExecutionFuture, ToolExecutorTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Python execution tool executor.
///
/// Every call runs in a fresh child interpreter; see [`crate::sandbox`].
#[derive(Debug, Clone, Default)]
pub struct PythonRunTool {
    sandbox: Arc<PythonSandbox>,
}

#[derive(Debug, Deserialize)]
struct PythonRunArgs {
    code: String,
    #[serde(default)]
    allowed_imports: Option<Vec<String>>,
    #[serde(default)]
    denied_imports: Vec<String>,
    #[serde(default)]
    timeout_seconds: Option<f64>,
}

impl PythonRunTool {
    /// Creates the tool around a configured sandbox.
    #[must_use]
    pub fn new(sandbox: Arc<PythonSandbox>) -> Self {
        Self { sandbox }
    }

    /// Returns the bindable tool.
    #[must_use]
    pub fn tool(sandbox: Arc<PythonSandbox>) -> Tool {
        let max = sandbox.config().max_timeout_secs;
        let default = sandbox.config().default_timeout_secs;
        Tool::new(
            ToolDefinition {
                name: "python_run".to_string(),
                description: "Run a short Python snippet in a restricted sandbox and return its \
                              result: the value of a single expression, else the variable `result`, \
                              else printed output. Imports are blocked unless listed in allowed_imports. \
                              math and statistics are always available."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Python source to execute"
                        },
                        "allowed_imports": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Modules the snippet may import, e.g. [\"json\", \"re\"]"
                        },
                        "denied_imports": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Additional modules to block"
                        },
                        "timeout_seconds": {
                            "type": "number",
                            "description": format!("Wall-clock limit (default: {default}, max: {max})"),
                            "exclusiveMinimum": 0
                        }
                    },
                    "required": ["code"]
                }),
            },
            Self::new(sandbox),
        )
    }
}

impl ToolExecutorTrait for PythonRunTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        let sandbox = Arc::clone(&self.sandbox);
        Box::pin(async move {
            let args: PythonRunArgs = parse_args("python_run", args)?;

            let mut request = SandboxRequest::new(args.code)
                .with_denied_imports(args.denied_imports)
                .with_timeout(sandbox.config().clamp_timeout(args.timeout_seconds));
            if let Some(allowed) = args.allowed_imports {
                request = request.with_allowed_imports(allowed);
            }

            let outcome = sandbox.run(&request).await;
            Ok(Value::String(outcome.to_string()))
        })
    }

    fn validate_args(&self, args: &Value) -> Result<(), crate::tools::ToolError> {
        match args.get("code") {
            Some(Value::String(_)) => Ok(()),
            _ => Err(crate::tools::ToolError::validation_failed(
                "python_run",
                "code must be a string",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ToolArguments;

    fn args(value: Value) -> ToolArguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn denial_is_returned_as_text() {
        let tool = PythonRunTool::tool(Arc::default());
        let out = tool
            .invoke(&args(json!({"code": "import subprocess", "allowed_imports": ["subprocess"]})))
            .await
            .unwrap();
        assert_eq!(out, "Error: import of 'subprocess' is not permitted");
    }

    #[tokio::test]
    async fn missing_code_is_rejected() {
        let tool = PythonRunTool::tool(Arc::default());
        let err = tool.invoke(&args(json!({"timeout_seconds": 1}))).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn schema_mentions_limits() {
        let tool = PythonRunTool::tool(Arc::default());
        let schema = &tool.definition.input_schema;
        assert_eq!(schema["required"][0], "code");
        assert!(schema["properties"]["timeout_seconds"]["description"]
            .as_str()
            .unwrap()
            .contains("max: 30"));
    }
}
