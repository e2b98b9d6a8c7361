use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for copying a file within the project.
pub struct CopyFileTool {
    workspace: Workspace,
}

impl CopyFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<serde_json::Value, String> {
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
            .map_err(|e| format!("Failed to copy '{source}': {e}"))?;
        if metadata.is_dir() {
            return Err(format!("'{source}' is a folder, use copy_folder instead"));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create parent folder for '{destination}': {e}"))?;
        }

        let bytes = fs::copy(&from, &to)
            .await
            .map_err(|e| format!("Failed to copy '{source}' to '{destination}': {e}"))?;

        Ok(json!({
            "source": self.workspace.relative(&from),
            "destination": self.workspace.relative(&to),
            "bytes": bytes,
        }))
    }
}

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &str {
        "copy_file"
    }

    fn description(&self) -> &str {
        "Copy a file to a new location inside the project, creating destination folders as needed"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Path of the file to copy"
                },
                "destination": {
                    "type": "string",
                    "description": "Path to copy the file to"
                }
            },
            "required": ["source", "destination"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let source = required_str(&args, "source")?;
        let destination = required_str(&args, "destination")?;

        match self.copy(source, destination).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_into_new_nested_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "payload").await.unwrap();

        let tool = CopyFileTool::new(Workspace::new(dir.path()));
        let result = tool
            .execute(json!({"source": "a.txt", "destination": "nested/deep/b.txt"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            fs::read_to_string(dir.path().join("nested/deep/b.txt")).await.unwrap(),
            "payload"
        );
        // Source still exists after a copy.
        assert!(fs::metadata(dir.path().join("a.txt")).await.is_ok());
    }

    #[tokio::test]
    async fn both_paths_are_sandboxed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x").await.unwrap();
        let tool = CopyFileTool::new(Workspace::new(dir.path()));

        let result = tool
            .execute(json!({"source": "a.txt", "destination": "../out.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.unwrap(), SANDBOX_VIOLATION);

        let result = tool
            .execute(json!({"source": "../a.txt", "destination": "b.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn folder_source_is_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = CopyFileTool::new(Workspace::new(dir.path()));
        let result = tool
            .execute(json!({"source": "sub", "destination": "sub2"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("copy_folder"));
    }
}
