use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for moving/renaming a file within the project.
pub struct MoveFileTool {
    workspace: Workspace,
}

impl MoveFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn move_file(&self, source: &str, destination: &str) -> Result<serde_json::Value, String> {
        let from = self
            .workspace
            .resolve(source)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;
        let to = self
            .workspace
            .resolve(destination)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let metadata = fs::metadata(&from)
            .await
            .map_err(|e| format!("Failed to move '{source}': {e}"))?;
        if metadata.is_dir() {
            return Err(format!("'{source}' is a folder, use move_folder instead"));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create parent folder for '{destination}': {e}"))?;
        }

        // Atomic rename where the filesystem allows it; copy-and-delete
        // otherwise (e.g. across mount points).
        if fs::rename(&from, &to).await.is_err() {
            fs::copy(&from, &to)
                .await
                .map_err(|e| format!("Failed to move '{source}' to '{destination}': {e}"))?;
            fs::remove_file(&from)
                .await
                .map_err(|e| format!("Failed to remove '{source}' after copy: {e}"))?;
        }

        Ok(json!({
            "source": self.workspace.relative(&from),
            "destination": self.workspace.relative(&to),
        }))
    }
}

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &str {
        "move_file"
    }

    fn description(&self) -> &str {
        "Move or rename a file inside the project, creating destination folders as needed"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Path of the file to move"
                },
                "destination": {
                    "type": "string",
                    "description": "Path to move the file to"
                }
            },
            "required": ["source", "destination"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let source = required_str(&args, "source")?;
        let destination = required_str(&args, "destination")?;

        match self.move_file(source, destination).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
