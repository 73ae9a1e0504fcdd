//! Filesystem tools.
//!
//! I/O failures are reported to the model as `Error: ...` text so it can
//! correct the path and try again; only malformed arguments are tool errors.

use crate::messages::ToolDefinition;
use crate::tools::{parse_args, Tool, ToolExecutionFuture, ToolExecutorTrait};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use tokio::io::AsyncWriteExt;

/// Characters returned by `read_file`.
pub const READ_LIMIT_CHARS: usize = 10_000;

fn io_failure(action: &str, path: &str, e: &io::Error) -> Value {
    Value::String(format!("Error: failed to {action} {path}: {e}"))
}

fn definition(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct TextArgs {
    file_path: String,
    text: String,
}

/// Returns the first [`READ_LIMIT_CHARS`] characters of a text file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadFileTool;

impl ReadFileTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "read_file",
                "Read a text file and return up to the first 10000 characters.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": {"type": "string", "description": "Path to the file"}
                    },
                    "required": ["file_path"]
                }),
            ),
            Self,
        )
    }
}

impl ToolExecutorTrait for ReadFileTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let PathArgs { file_path } = parse_args("read_file", args)?;
            match tokio::fs::read_to_string(&file_path).await {
                Ok(text) => Ok(Value::String(text.chars().take(READ_LIMIT_CHARS).collect())),
                Err(e) => Ok(io_failure("read", &file_path, &e)),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ImagesArgs {
    image_paths: Vec<String>,
}

/// Returns each image file as base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadImagesTool;

impl ReadImagesTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "read_images",
                "Read image files and return each one base64-encoded, in order.",
                json!({
                    "type": "object",
                    "properties": {
                        "image_paths": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Paths to the image files"
                        }
                    },
                    "required": ["image_paths"]
                }),
            ),
            Self,
        )
    }
}

impl ToolExecutorTrait for ReadImagesTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let ImagesArgs { image_paths } = parse_args("read_images", args)?;
            let mut encoded = Vec::with_capacity(image_paths.len());
            for path in &image_paths {
                match tokio::fs::read(path).await {
                    Ok(bytes) => encoded.push(Value::String(BASE64.encode(bytes))),
                    Err(e) => return Ok(io_failure("read", path, &e)),
                }
            }
            Ok(Value::Array(encoded))
        })
    }
}

/// Creates or overwrites a file.
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteFileTool;

impl WriteFileTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "write_file",
                "Write text to a file, replacing any existing content.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": {"type": "string"},
                        "text": {"type": "string", "description": "Full file content"}
                    },
                    "required": ["file_path", "text"]
                }),
            ),
            Self,
        )
    }
}

impl ToolExecutorTrait for WriteFileTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let TextArgs { file_path, text } = parse_args("write_file", args)?;
            match tokio::fs::write(&file_path, text.as_bytes()).await {
                Ok(()) => Ok(json!(format!("File written successfully to {file_path}"))),
                Err(e) => Ok(io_failure("write", &file_path, &e)),
            }
        })
    }
}

/// Appends to a file, creating it if needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendToFileTool;

impl AppendToFileTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "append_to_file",
                "Append text to the end of a file, creating it if it does not exist.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": {"type": "string"},
                        "text": {"type": "string"}
                    },
                    "required": ["file_path", "text"]
                }),
            ),
            Self,
        )
    }

    async fn append(path: &str, text: &str) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }
}

impl ToolExecutorTrait for AppendToFileTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let TextArgs { file_path, text } = parse_args("append_to_file", args)?;
            match Self::append(&file_path, &text).await {
                Ok(()) => Ok(json!(format!("Text appended to {file_path}"))),
                Err(e) => Ok(io_failure("append to", &file_path, &e)),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct EditArgs {
    file_path: String,
    old_text: String,
    new_text: String,
}

/// Replaces one exact occurrence of a string in a file.
#[derive(Debug, Default, Clone, Copy)]
pub struct EditFileTool;

impl EditFileTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "edit_file",
                "Replace the first exact occurrence of old_text with new_text in a file.",
                json!({
                    "type": "object",
                    "properties": {
                        "file_path": {"type": "string"},
                        "old_text": {"type": "string", "description": "Exact text to find"},
                        "new_text": {"type": "string", "description": "Replacement text"}
                    },
                    "required": ["file_path", "old_text", "new_text"]
                }),
            ),
            Self,
        )
    }
}

impl ToolExecutorTrait for EditFileTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let EditArgs {
                file_path,
                old_text,
                new_text,
            } = parse_args("edit_file", args)?;

            if old_text.is_empty() {
                return Ok(json!("Error: old_text must not be empty"));
            }
            let content = match tokio::fs::read_to_string(&file_path).await {
                Ok(content) => content,
                Err(e) => return Ok(io_failure("read", &file_path, &e)),
            };
            if !content.contains(&old_text) {
                return Ok(json!(format!("Error: text not found in {file_path}")));
            }

            let updated = content.replacen(&old_text, &new_text, 1);
            match tokio::fs::write(&file_path, updated).await {
                Ok(()) => Ok(json!(format!("File edited successfully: {file_path}"))),
                Err(e) => Ok(io_failure("write", &file_path, &e)),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirArgs {
    directory: String,
}

/// Lists the entries of a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFilesTool;

impl ListFilesTool {
    /// Returns the bindable tool.
    #[must_use]
    pub fn tool() -> Tool {
        Tool::new(
            definition(
                "list_files",
                "List the names of the entries in a directory, sorted.",
                json!({
                    "type": "object",
                    "properties": {
                        "directory": {"type": "string"}
                    },
                    "required": ["directory"]
                }),
            ),
            Self,
        )
    }

    async fn list(directory: &str) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(directory).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

impl ToolExecutorTrait for ListFilesTool {
    fn execute(&self, args: Value) -> ToolExecutionFuture {
        Box::pin(async move {
            let DirArgs { directory } = parse_args("list_files", args)?;
            match Self::list(&directory).await {
                Ok(names) => Ok(json!(names)),
                Err(e) => Ok(io_failure("list", &directory, &e)),
            }
        })
    }
}

/// Returns every file tool.
#[must_use]
pub fn file_tools() -> Vec<Tool> {
    vec![
        ReadFileTool::tool(),
        ReadImagesTool::tool(),
        WriteFileTool::tool(),
        AppendToFileTool::tool(),
        EditFileTool::tool(),
        ListFilesTool::tool(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ToolArguments;
    use tempfile::TempDir;

    fn args(value: Value) -> ToolArguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        let path = path.to_str().unwrap();

        let out = WriteFileTool::tool()
            .invoke(&args(json!({"file_path": path, "text": "Hello, world!"})))
            .await
            .unwrap();
        assert!(out.starts_with("File written successfully"));

        let out = ReadFileTool::tool()
            .invoke(&args(json!({"file_path": path})))
            .await
            .unwrap();
        assert_eq!(out, "Hello, world!");
    }

    #[tokio::test]
    async fn read_is_capped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "é".repeat(READ_LIMIT_CHARS + 50)).unwrap();

        let out = ReadFileTool::tool()
            .invoke(&args(json!({"file_path": path.to_str().unwrap()})))
            .await
            .unwrap();
        assert_eq!(out.chars().count(), READ_LIMIT_CHARS);
    }

    #[tokio::test]
    async fn missing_file_is_text_not_error() {
        let out = ReadFileTool::tool()
            .invoke(&args(json!({"file_path": "/definitely/not/here.txt"})))
            .await
            .unwrap();
        assert!(out.starts_with("Error: failed to read"));
    }

    #[tokio::test]
    async fn append_creates_and_extends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");
        let path_str = path.to_str().unwrap();

        for line in ["one\n", "two\n"] {
            AppendToFileTool::tool()
                .invoke(&args(json!({"file_path": path_str, "text": line})))
                .await
                .unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn edit_replaces_first_occurrence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.txt");
        std::fs::write(&path, "cat cat cat").unwrap();
        let path_str = path.to_str().unwrap();

        let out = EditFileTool::tool()
            .invoke(&args(json!({"file_path": path_str, "old_text": "cat", "new_text": "dog"})))
            .await
            .unwrap();
        assert!(out.starts_with("File edited successfully"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dog cat cat");

        let out = EditFileTool::tool()
            .invoke(&args(json!({"file_path": path_str, "old_text": "bird", "new_text": "x"})))
            .await
            .unwrap();
        assert!(out.starts_with("Error: text not found"));
    }

    #[tokio::test]
    async fn list_files_is_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();

        let out = ListFilesTool::tool()
            .invoke(&args(json!({"directory": dir.path().to_str().unwrap()})))
            .await
            .unwrap();
        assert_eq!(out, r#"["a.txt","b.txt"]"#);
    }

    #[tokio::test]
    async fn read_images_encodes_base64() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let out = ReadImagesTool::tool()
            .invoke(&args(json!({"image_paths": [path.to_str().unwrap()]})))
            .await
            .unwrap();
        let decoded: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(BASE64.decode(&decoded[0]).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn wrong_argument_shape_is_a_tool_error() {
        let err = WriteFileTool::tool()
            .invoke(&args(json!({"file_path": "/tmp/x"})))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
