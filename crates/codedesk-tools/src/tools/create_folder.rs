use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for creating a folder (recursively).
pub struct CreateFolderTool {
    workspace: Workspace,
}

impl CreateFolderTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn create(&self, path: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let already_there = fs::try_exists(&resolved)
            .await
            .map_err(|e| format!("Failed to create folder '{path}': {e}"))?;
        if already_there {
            return Err(format!("'{path}' already exists"));
        }

        fs::create_dir_all(&resolved)
            .await
            .map_err(|e| format!("Failed to create folder '{path}': {e}"))?;

        Ok(json!({ "path": self.workspace.relative(&resolved), "created": true }))
    }
}

#[async_trait]
impl Tool for CreateFolderTool {
    fn name(&self) -> &str {
        "create_folder"
    }

    fn description(&self) -> &str {
        "Create a folder, including any missing parents. Fails if the path already exists"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the folder, relative to the project root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;

        match self.create(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
