//! Arithmetic and elementary function tools.
//!
//! Domain errors (division by zero, square root of a negative number,
//! logarithm of a non-positive number) are returned to the model as text.

use crate::messages::ToolDefinition;
use crate::tools::{parse_args, Tool, ToolExecutionFuture, ToolExecutorTrait};
use serde::Deserialize;
use serde_json::{json, Value};

/// The operation a [`MathTool`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    /// a + b
    Addition,
    /// a - b
    Subtraction,
    /// a * b
    Multiplication,
    /// a / b
    Division,
    /// base ^ exponent
    Exponentiation,
    /// sqrt(x)
    SquareRoot,
    /// sin(x), radians
    Sine,
    /// cos(x), radians
    Cosine,
    /// tan(x), radians
    Tangent,
    /// ln(x) or log_base(x)
    Logarithm,
    /// |x|
    AbsoluteValue,
}

impl MathOp {
    /// Every operation, in the order tools are advertised.
    pub const ALL: [MathOp; 11] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::Exponentiation,
        Self::SquareRoot,
        Self::Sine,
        Self::Cosine,
        Self::Tangent,
        Self::Logarithm,
        Self::AbsoluteValue,
    ];

    /// Returns the tool name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Exponentiation => "exponentiation",
            Self::SquareRoot => "square_root",
            Self::Sine => "sine",
            Self::Cosine => "cosine",
            Self::Tangent => "tangent",
            Self::Logarithm => "logarithm",
            Self::AbsoluteValue => "absolute_value",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Addition => "Return the sum of a and b.",
            Self::Subtraction => "Return a minus b.",
            Self::Multiplication => "Return the product of a and b.",
            Self::Division => "Return a divided by b. b must not be zero.",
            Self::Exponentiation => "Return base raised to the power exponent.",
            Self::SquareRoot => "Return the square root of a non-negative x.",
            Self::Sine => "Return the sine of x, given in radians.",
            Self::Cosine => "Return the cosine of x, given in radians.",
            Self::Tangent => "Return the tangent of x, given in radians.",
            Self::Logarithm => {
                "Return the logarithm of a positive x. Natural logarithm unless base is given."
            }
            Self::AbsoluteValue => "Return the absolute value of x.",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::Addition | Self::Subtraction | Self::Multiplication | Self::Division => json!({
                "type": "object",
                "properties": {
                    "a": {"type": "number", "description": "First operand"},
                    "b": {"type": "number", "description": "Second operand"}
                },
                "required": ["a", "b"]
            }),
            Self::Exponentiation => json!({
                "type": "object",
                "properties": {
                    "base": {"type": "number"},
                    "exponent": {"type": "number"}
                },
                "required": ["base", "exponent"]
            }),
            Self::Logarithm => json!({
                "type": "object",
                "properties": {
                    "x": {"type": "number", "description": "Positive input"},
                    "base": {"type": "number", "description": "Logarithm base (default: e)"}
                },
                "required": ["x"]
            }),
            _ => json!({
                "type": "object",
                "properties": {
                    "x": {"type": "number"}
                },
                "required": ["x"]
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Binary {
    a: f64,
    b: f64,
}

#[derive(Debug, Deserialize)]
struct Power {
    base: f64,
    exponent: f64,
}

#[derive(Debug, Deserialize)]
struct Unary {
    x: f64,
}

#[derive(Debug, Deserialize)]
struct Log {
    x: f64,
    #[serde(default)]
    base: Option<f64>,
}

/// Executor for one [`MathOp`].
#[derive(Debug, Clone, Copy)]
pub struct MathTool {
    op: MathOp,
}

impl MathTool {
    /// Creates the executor for `op`.
    #[must_use]
    pub fn new(op: MathOp) -> Self {
        Self { op }
    }

    /// Returns the bindable tool for `op`.
    #[must_use]
    pub fn tool(op: MathOp) -> Tool {
        Tool::new(
            ToolDefinition {
                name: op.name().to_string(),
                description: op.description().to_string(),
                input_schema: op.input_schema(),
            },
            Self::new(op),
        )
    }

    fn compute(self, args: Value) -> Result<Result<f64, String>, crate::tools::ToolError> {
        let name = self.op.name();
        let value = match self.op {
            MathOp::Addition => {
                let Binary { a, b } = parse_args(name, args)?;
                Ok(a + b)
            }
            MathOp::Subtraction => {
                let Binary { a, b } = parse_args(name, args)?;
                Ok(a - b)
            }
            MathOp::Multiplication => {
                let Binary { a, b } = parse_args(name, args)?;
                Ok(a * b)
            }
            MathOp::Division => {
                let Binary { a, b } = parse_args(name, args)?;
                if b == 0.0 {
                    Err("division by zero".to_string())
                } else {
                    Ok(a / b)
                }
            }
            MathOp::Exponentiation => {
                let Power { base, exponent } = parse_args(name, args)?;
                Ok(base.powf(exponent))
            }
            MathOp::SquareRoot => {
                let Unary { x } = parse_args(name, args)?;
                if x < 0.0 {
                    Err(format!("cannot take the square root of negative number {x}"))
                } else {
                    Ok(x.sqrt())
                }
            }
            MathOp::Sine => parse_args::<Unary>(name, args).map(|u| Ok(u.x.sin()))?,
            MathOp::Cosine => parse_args::<Unary>(name, args).map(|u| Ok(u.x.cos()))?,
            MathOp::Tangent => parse_args::<Unary>(name, args).map(|u| Ok(u.x.tan()))?,
            MathOp::Logarithm => {
                let Log { x, base } = parse_args(name, args)?;
                match base {
                    _ if x <= 0.0 => Err(format!("logarithm is undefined for {x}")),
                    Some(b) if b <= 0.0 || b == 1.0 => Err(format!("invalid logarithm base {b}")),
                    Some(b) if b == 10.0 => Ok(x.log10()),
                    Some(b) if b == 2.0 => Ok(x.log2()),
                    Some(b) => Ok(x.log(b)),
                    None => Ok(x.ln()),
                }
            }
            MathOp::AbsoluteValue => parse_args::<Unary>(name, args).map(|u| Ok(u.x.abs()))?,
        };

        Ok(value.and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err("result is not a finite number".to_string())
            }
        }))
    }
}

impl ToolExecutorTrait for MathTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        let result = self.compute(args);
        Box::pin(async move {
            match result? {
                Ok(v) => Ok(json!(v)),
                Err(message) => Ok(Value::String(format!("Error: {message}"))),
            }
        })
    }
}

/// Returns every math tool.
#[must_use]
pub fn math_tools() -> Vec<Tool> {
    MathOp::ALL.into_iter().map(MathTool::tool).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(op: MathOp, args: Value) -> String {
        let Value::Object(map) = args else {
            panic!("arguments must be an object")
        };
        MathTool::tool(op).invoke(&map).await.unwrap()
    }

    #[tokio::test]
    async fn arithmetic() {
        assert_eq!(run(MathOp::Addition, json!({"a": 2, "b": 3.5})).await, "5.5");
        assert_eq!(run(MathOp::Subtraction, json!({"a": 2, "b": 3})).await, "-1.0");
        assert_eq!(run(MathOp::Multiplication, json!({"a": 4, "b": 2.5})).await, "10.0");
        assert_eq!(run(MathOp::Division, json!({"a": 9, "b": 2})).await, "4.5");
        assert_eq!(run(MathOp::Exponentiation, json!({"base": 2, "exponent": 10})).await, "1024.0");
    }

    #[tokio::test]
    async fn domain_errors_are_text() {
        assert_eq!(
            run(MathOp::Division, json!({"a": 1, "b": 0})).await,
            "Error: division by zero"
        );
        assert!(run(MathOp::SquareRoot, json!({"x": -4})).await.starts_with("Error:"));
        assert!(run(MathOp::Logarithm, json!({"x": 0})).await.starts_with("Error:"));
        assert!(run(MathOp::Logarithm, json!({"x": 8, "base": 1})).await.starts_with("Error:"));
    }

    #[tokio::test]
    async fn logarithm_with_and_without_base() {
        assert_eq!(run(MathOp::Logarithm, json!({"x": 1})).await, "0.0");
        assert_eq!(run(MathOp::Logarithm, json!({"x": 100, "base": 10})).await, "2.0");
    }

    #[tokio::test]
    async fn unary_functions() {
        assert_eq!(run(MathOp::SquareRoot, json!({"x": 16})).await, "4.0");
        assert_eq!(run(MathOp::AbsoluteValue, json!({"x": -3})).await, "3.0");
        assert_eq!(run(MathOp::Sine, json!({"x": 0})).await, "0.0");
        assert_eq!(run(MathOp::Cosine, json!({"x": 0})).await, "1.0");
    }

    #[tokio::test]
    async fn missing_arguments_are_a_tool_error() {
        let Value::Object(map) = json!({"a": 1}) else {
            unreachable!()
        };
        let err = MathTool::tool(MathOp::Addition).invoke(&map).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn every_op_has_a_distinct_name() {
        let tools = math_tools();
        assert_eq!(tools.len(), 11);
        let mut names: Vec<_> = tools.iter().map(Tool::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
    }
}
