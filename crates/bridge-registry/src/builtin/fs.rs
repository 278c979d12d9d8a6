//! `read_file` and `list_directory`.
//!
//! Both are path-screened by the registry before they run, so these handlers
//! only deal with I/O.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::io::AsyncReadExt;

use super::truncate_utf8;
use crate::descriptor::{Screening, ToolDescriptor, ToolHandler};
use crate::models::{FieldError, ToolError, ToolOutput};

/// Largest file `read_file` will return.
pub const MAX_READ_BYTES: usize = 1024 * 1024;

/// Handler for `read_file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFile;

/// Handler for `list_directory`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDirectory;

pub(super) fn read_file_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "read_file",
        "Read a UTF-8 text file from the host",
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "File to read" }
            },
            "required": ["path"]
        }),
        ReadFile,
    )
    .with_screening(Screening::Path { field: "path" })
}

pub(super) fn list_directory_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "list_directory",
        "List the entries of a directory on the host",
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Directory to list" }
            },
            "required": ["path"]
        }),
        ListDirectory,
    )
    .with_screening(Screening::Path { field: "path" })
}

fn path_arg(args: &Map<String, Value>) -> Result<&Path, ToolError> {
    match args.get("path").and_then(Value::as_str) {
        Some(path) if !path.trim().is_empty() => Ok(Path::new(path)),
        _ => Err(ToolError::Validation(vec![FieldError::new(
            "path",
            "Must not be empty",
        )])),
    }
}

#[async_trait]
impl ToolHandler for ReadFile {
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let path = path_arg(args)?;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ToolError::Failed(format!("{}: {e}", path.display())))?;

        // One byte past the cap tells us whether the file was cut.
        let mut bytes = Vec::new();
        file.take(MAX_READ_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .await?;

        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(ToolOutput::text(truncate_utf8(text, MAX_READ_BYTES)))
    }
}

#[async_trait]
impl ToolHandler for ListDirectory {
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let path = path_arg(args)?;
        let mut reader = tokio::fs::read_dir(path)
            .await
            .map_err(|e| ToolError::Failed(format!("{}: {e}", path.display())))?;

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            return Ok(ToolOutput::text("(empty directory)"));
        }
        Ok(ToolOutput::text(names.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolContent;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn text(output: &ToolOutput) -> &str {
        match &output.content[0] {
            ToolContent::Text { text } => text,
            ToolContent::Image { .. } => panic!("expected text"),
        }
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "line one\nline two\n").unwrap();

        let output = ReadFile
            .execute(&args(json!({ "path": file.to_str().unwrap() })))
            .await
            .unwrap();
        assert_eq!(text(&output), "line one\nline two\n");
    }

    #[tokio::test]
    async fn test_read_file_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.txt");
        std::fs::write(&file, "a".repeat(MAX_READ_BYTES + 10)).unwrap();

        let output = ReadFile
            .execute(&args(json!({ "path": file.to_str().unwrap() })))
            .await
            .unwrap();
        assert!(text(&output).ends_with("[output truncated]"));
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("absent.txt");
        let err = ReadFile
            .execute(&args(json!({ "path": file.to_str().unwrap() })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed(_)));
    }

    #[tokio::test]
    async fn test_list_directory_sorted_with_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();

        let output = ListDirectory
            .execute(&args(json!({ "path": dir.path().to_str().unwrap() })))
            .await
            .unwrap();
        assert_eq!(text(&output), "a.txt\nb.txt\nsrc/");
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = ListDirectory
            .execute(&args(json!({ "path": dir.path().to_str().unwrap() })))
            .await
            .unwrap();
        assert_eq!(text(&output), "(empty directory)");
    }

    #[tokio::test]
    async fn test_blank_path_rejected() {
        let err = ReadFile.execute(&args(json!({ "path": "" }))).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
