use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for deleting a single file.
pub struct DeleteFileTool {
    workspace: Workspace,
}

impl DeleteFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn delete(&self, path: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| format!("Failed to delete file '{path}': {e}"))?;
        if metadata.is_dir() {
            return Err(format!("'{path}' is a folder, use delete_folder instead"));
        }

        fs::remove_file(&resolved)
            .await
            .map_err(|e| format!("Failed to delete file '{path}': {e}"))?;

        Ok(json!({ "path": self.workspace.relative(&resolved), "deleted": true }))
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a single file. Folders must be removed with delete_folder"
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

        match self.delete(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
