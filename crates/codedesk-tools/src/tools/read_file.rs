use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::{modified_rfc3339, required_str};

/// Tool for reading file contents inside the project sandbox.
pub struct ReadFileTool {
    workspace: Workspace,
}

impl ReadFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn read(&self, path: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| format!("Failed to read file '{path}': {e}"))?;
        if metadata.is_dir() {
            return Err(format!("'{path}' is a folder, use list_folder instead"));
        }

        let content = fs::read_to_string(&resolved)
            .await
            .map_err(|e| format!("Failed to read file '{path}': {e}"))?;

        Ok(json!({
            "path": self.workspace.relative(&resolved),
            "content": content,
            "size": metadata.len(),
            "modified": modified_rfc3339(&metadata),
        }))
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file's content. The path is relative to the project root (absolute paths must stay inside it)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file, relative to the project root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;

        match self.read(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(dir: &tempfile::TempDir) -> Workspace {
        Workspace::new(dir.path())
    }

    #[tokio::test]
    async fn reads_file_content_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "hi there").await.unwrap();

        let tool = ReadFileTool::new(workspace(&dir));
        let result = tool.execute(json!({"path": "hello.txt"})).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["content"], "hi there");
        assert_eq!(data["size"], 8);
        assert!(data["modified"].is_string());
    }

    #[tokio::test]
    async fn missing_file_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadFileTool::new(workspace(&dir));

        let result = tool.execute(json!({"path": "nope.txt"})).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("nope.txt"));
    }

    #[tokio::test]
    async fn directory_target_is_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = ReadFileTool::new(workspace(&dir));
        let result = tool.execute(json!({"path": "sub"})).await.unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("list_folder"));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_disk_access() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadFileTool::new(workspace(&dir));

        let result = tool
            .execute(json!({"path": "../../etc/passwd"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.unwrap(), SANDBOX_VIOLATION);
    }

    #[tokio::test]
    async fn missing_parameter_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadFileTool::new(workspace(&dir));

        let result = tool.execute(json!({})).await;
        assert!(result.is_err());
    }
}
