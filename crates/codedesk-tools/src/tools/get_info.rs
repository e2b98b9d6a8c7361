use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::{modified_rfc3339, required_str};

/// Tool for reading metadata about a file or folder.
pub struct GetInfoTool {
    workspace: Workspace,
}

impl GetInfoTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn info(&self, path: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| format!("Failed to get info for '{path}': {e}"))?;

        let mut data = json!({
            "path": self.workspace.relative(&resolved),
            "type": if metadata.is_dir() { "folder" } else { "file" },
            "size": metadata.len(),
            "readonly": metadata.permissions().readonly(),
        });
        if let Some(modified) = modified_rfc3339(&metadata) {
            data["modified"] = json!(modified);
        }
        Ok(data)
    }
}

#[async_trait]
impl Tool for GetInfoTool {
    fn name(&self) -> &str {
        "get_info"
    }

    fn description(&self) -> &str {
        "Get metadata (type, size, modification time, readonly flag) for a file or folder"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to inspect, relative to the project root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;

        match self.info(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_file_metadata() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "12345").await.unwrap();

        let tool = GetInfoTool::new(Workspace::new(dir.path()));
        let result = tool.execute(json!({"path": "f.txt"})).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["type"], "file");
        assert_eq!(data["size"], 5);
        assert_eq!(data["readonly"], false);
        assert!(data["modified"].is_string());
    }

    #[tokio::test]
    async fn reports_folder_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = GetInfoTool::new(Workspace::new(dir.path()));
        let data = tool
            .execute(json!({"path": "sub"}))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(data["type"], "folder");
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = GetInfoTool::new(Workspace::new(dir.path()));

        let result = tool.execute(json!({"path": "ghost"})).await.unwrap();
        assert!(!result.success);
    }
}
