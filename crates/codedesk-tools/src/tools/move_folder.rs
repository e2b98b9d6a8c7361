use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, ROOT_GUARD, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for moving/renaming a folder within the project.
pub struct MoveFolderTool {
    workspace: Workspace,
}

impl MoveFolderTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn move_folder(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<serde_json::Value, String> {
        if source == "." || source == "./" {
            return Err(ROOT_GUARD.to_string());
        }

        let from = self
            .workspace
            .resolve(source)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;
        let to = self
            .workspace
            .resolve(destination)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;
        if self.workspace.is_root(&from) {
            return Err(ROOT_GUARD.to_string());
        }

        let metadata = fs::metadata(&from)
            .await
            .map_err(|e| format!("Failed to move folder '{source}': {e}"))?;
        if !metadata.is_dir() {
            return Err(format!("'{source}' is a file, use move_file instead"));
        }
        if to.starts_with(&from) {
            return Err(format!(
                "Cannot move '{source}' into itself ('{destination}')"
            ));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create parent folder for '{destination}': {e}"))?;
        }

        fs::rename(&from, &to)
            .await
            .map_err(|e| format!("Failed to move '{source}' to '{destination}': {e}"))?;

        Ok(json!({
            "source": self.workspace.relative(&from),
            "destination": self.workspace.relative(&to),
        }))
    }
}

#[async_trait]
impl Tool for MoveFolderTool {
    fn name(&self) -> &str {
        "move_folder"
    }

    fn description(&self) -> &str {
        "Move or rename a folder inside the project. The project root itself cannot be moved"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Path of the folder to move"
                },
                "destination": {
                    "type": "string",
                    "description": "Path to move the folder to"
                }
            },
            "required": ["source", "destination"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let source = required_str(&args, "source")?;
        let destination = required_str(&args, "destination")?;

        match self.move_folder(source, destination).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
