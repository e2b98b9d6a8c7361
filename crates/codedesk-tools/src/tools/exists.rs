use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for checking whether a path exists.
pub struct ExistsTool {
    workspace: Workspace,
}

impl ExistsTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn check(&self, path: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        match fs::metadata(&resolved).await {
            Ok(metadata) => Ok(json!({
                "exists": true,
                "type": if metadata.is_dir() { "folder" } else { "file" },
            })),
            Err(_) => Ok(json!({ "exists": false })),
        }
    }
}

#[async_trait]
impl Tool for ExistsTool {
    fn name(&self) -> &str {
        "exists"
    }

    fn description(&self) -> &str {
        "Check whether a file or folder exists at the given path"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to check, relative to the project root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;

        match self.check(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_file_and_folder_types() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "x").await.unwrap();
        fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = ExistsTool::new(Workspace::new(dir.path()));

        let data = tool
            .execute(json!({"path": "f.txt"}))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(data["exists"], true);
        assert_eq!(data["type"], "file");

        let data = tool
            .execute(json!({"path": "sub"}))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(data["type"], "folder");
    }

    #[tokio::test]
    async fn missing_path_is_success_with_exists_false() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExistsTool::new(Workspace::new(dir.path()));

        let result = tool.execute(json!({"path": "ghost"})).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["exists"], false);
        assert!(data.get("type").is_none());
    }

    #[tokio::test]
    async fn path_outside_project_is_still_a_violation() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExistsTool::new(Workspace::new(dir.path()));

        let result = tool.execute(json!({"path": "../secret"})).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.unwrap(), SANDBOX_VIOLATION);
    }
}
