use std::collections::HashSet;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for writing file contents, creating parent directories as needed.
pub struct WriteFileTool {
    workspace: Workspace,
}

impl WriteFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn write(&self, path: &str, content: &str) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let existing = fs::read_to_string(&resolved).await.ok();
        let is_new_file = existing.is_none();

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create parent folder for '{path}': {e}"))?;
        }

        fs::write(&resolved, content)
            .await
            .map_err(|e| format!("Failed to write file '{path}': {e}"))?;

        // Set-membership line diff: counts are an approximate change
        // magnitude, not an exact LCS diff. Duplicate or reordered lines
        // are under/over-counted.
        let old_lines: HashSet<&str> = existing
            .as_deref()
            .map(|s| s.lines().collect())
            .unwrap_or_default();
        let new_lines: HashSet<&str> = content.lines().collect();
        let lines_added = new_lines.difference(&old_lines).count();
        let lines_removed = old_lines.difference(&new_lines).count();

        Ok(json!({
            "path": self.workspace.relative(&resolved),
            "is_new_file": is_new_file,
            "lines_added": lines_added,
            "lines_removed": lines_removed,
        }))
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating it and any parent folders if needed. Reports approximate added/removed line counts"
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
                    "description": "Content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;

        match self.write(path, content).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
