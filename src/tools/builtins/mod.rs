//! Built-in tools, organized in groups.
//!
//! ## Groups
//!
//! ### Math
//! - **addition**, **subtraction**, **multiplication**, **division**
//! - **exponentiation**, **square_root**, **absolute_value**
//! - **sine**, **cosine**, **tangent** (radians)
//! - **logarithm**: natural, or with an optional base
//!
//! ### File
//! - **read_file**: first 10000 characters of a text file
//! - **read_images**: image files as base64
//! - **write_file**, **append_to_file**, **edit_file**
//! - **list_files**: sorted directory entries
//!
//! ### Coding
//! - **python_run**: sandboxed snippet execution
//!
//! ## Usage
//!
//! ```rust
//! use toolstep::tools::{BuiltinTools, ToolGroup};
//!
//! let builtins = BuiltinTools::default();
//! let math = builtins.group(ToolGroup::Math);
//! assert_eq!(math.len(), 11);
//!
//! let picked = builtins.select(&["read_file", "python_run"]).unwrap();
//! assert_eq!(picked.len(), 2);
//! ```

mod files;
mod math;
mod python_run;

pub use files::{
    file_tools, AppendToFileTool, EditFileTool, ListFilesTool, ReadFileTool, ReadImagesTool,
    WriteFileTool, READ_LIMIT_CHARS,
};
pub use math::{math_tools, MathOp, MathTool};
pub use python_run::PythonRunTool;

use crate::sandbox::PythonSandbox;
use crate::tools::{Tool, ToolError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A named set of built-in tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolGroup {
    /// Arithmetic and elementary functions
    Math,
    /// Reading and writing files
    File,
    /// Sandboxed code execution
    Coding,
}

impl fmt::Display for ToolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Math => write!(f, "math"),
            Self::File => write!(f, "file"),
            Self::Coding => write!(f, "coding"),
        }
    }
}

/// Factory for built-in tools.
///
/// Holds the sandbox shared by every `python_run` tool it hands out.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTools {
    sandbox: Arc<PythonSandbox>,
}

impl BuiltinTools {
    /// Creates a factory whose coding tools use `sandbox`.
    #[must_use]
    pub fn new(sandbox: PythonSandbox) -> Self {
        Self {
            sandbox: Arc::new(sandbox),
        }
    }

    /// Returns the tools of one group.
    #[must_use]
    pub fn group(&self, group: ToolGroup) -> Vec<Tool> {
        match group {
            ToolGroup::Math => math_tools(),
            ToolGroup::File => file_tools(),
            ToolGroup::Coding => vec![PythonRunTool::tool(Arc::clone(&self.sandbox))],
        }
    }

    /// Returns the tools of several groups, in order.
    #[must_use]
    pub fn groups(&self, groups: &[ToolGroup]) -> Vec<Tool> {
        groups.iter().flat_map(|g| self.group(*g)).collect()
    }

    /// Returns every built-in tool.
    #[must_use]
    pub fn all(&self) -> Vec<Tool> {
        self.groups(&[ToolGroup::Math, ToolGroup::File, ToolGroup::Coding])
    }

    /// Returns only the named tools, in the order given.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for the first unknown name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use toolstep::tools::BuiltinTools;
    ///
    /// assert!(BuiltinTools::default().select(&["read_file", "nope"]).is_err());
    /// ```
    pub fn select(&self, names: &[&str]) -> Result<Vec<Tool>, ToolError> {
        let all = self.all();
        names
            .iter()
            .map(|name| {
                all.iter()
                    .find(|tool| tool.name() == *name)
                    .cloned()
                    .ok_or_else(|| ToolError::not_found(*name))
            })
            .collect()
    }

    /// Lists every built-in tool name.
    #[must_use]
    pub fn available() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = MathOp::ALL.iter().map(|op| op.name()).collect();
        names.extend([
            "read_file",
            "read_images",
            "write_file",
            "append_to_file",
            "edit_file",
            "list_files",
            "python_run",
        ]);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_have_expected_sizes() {
        let builtins = BuiltinTools::default();
        assert_eq!(builtins.group(ToolGroup::Math).len(), 11);
        assert_eq!(builtins.group(ToolGroup::File).len(), 6);
        assert_eq!(builtins.group(ToolGroup::Coding).len(), 1);
        assert_eq!(builtins.all().len(), 18);
    }

    #[test]
    fn available_matches_all() {
        let names: Vec<String> = BuiltinTools::default()
            .all()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, BuiltinTools::available());
    }

    #[test]
    fn select_keeps_order_and_rejects_unknown() {
        let builtins = BuiltinTools::default();
        let picked = builtins.select(&["python_run", "addition"]).unwrap();
        assert_eq!(picked[0].name(), "python_run");
        assert_eq!(picked[1].name(), "addition");

        let err = builtins.select(&["addition", "unknown_tool"]).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("unknown_tool"));
    }

    #[test]
    fn tool_definitions_are_well_formed() {
        for tool in BuiltinTools::default().all() {
            let def = &tool.definition;
            assert!(!def.description.is_empty(), "tool {} has empty description", def.name);
            assert_eq!(def.input_schema["type"], "object", "tool {} schema", def.name);
        }
    }

    #[test]
    fn group_names_round_trip_through_serde() {
        let group: ToolGroup = serde_json::from_str("\"coding\"").unwrap();
        assert_eq!(group, ToolGroup::Coding);
        assert_eq!(ToolGroup::File.to_string(), "file");
    }
}
