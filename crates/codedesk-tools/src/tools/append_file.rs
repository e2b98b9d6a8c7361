use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for appending content to a file.
///
/// Unlike `write_file`, missing parent folders are an error here.
pub struct AppendFileTool {
    workspace: Workspace,
}

impl AppendFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn append(&self, path: &str, content: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&resolved)
            .await
            .map_err(|e| format!("Failed to open file '{path}' for append: {e}"))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| format!("Failed to append to file '{path}': {e}"))?;
        file.flush()
            .await
            .map_err(|e| format!("Failed to append to file '{path}': {e}"))?;

        Ok(json!({
            "path": self.workspace.relative(&resolved),
            "bytes_appended": content.len(),
        }))
    }
}

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }

    fn description(&self) -> &str {
        "Append content to the end of a file, creating the file (but not parent folders) if missing"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file, relative to the project root"
                },
                "content": {
                    "type": "string",
                    "description": "Content to append"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;

        match self.append(path, content).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("log.txt"), "first\n").await.unwrap();

        let tool = AppendFileTool::new(Workspace::new(dir.path()));
        let result = tool
            .execute(json!({"path": "log.txt", "content": "second\n"}))
            .await
            .unwrap();

        assert!(result.success);
        let content = fs::read_to_string(dir.path().join("log.txt")).await.unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[tokio::test]
    async fn creates_missing_file_in_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let tool = AppendFileTool::new(Workspace::new(dir.path()));

        let result = tool
            .execute(json!({"path": "fresh.txt", "content": "hello"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            fs::read_to_string(dir.path().join("fresh.txt")).await.unwrap(),
            "hello"
        );
    }

    #[tokio::test]
    async fn missing_parent_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = AppendFileTool::new(Workspace::new(dir.path()));

        let result = tool
            .execute(json!({"path": "no_such_dir/x.txt", "content": "y"}))
            .await
            .unwrap();
        assert!(!result.success);
    }
}
