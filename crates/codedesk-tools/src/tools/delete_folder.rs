use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{normalize_path, Workspace, ROOT_GUARD, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for recursively deleting a folder.
///
/// The project root itself is protected by three redundant checks: the "."
/// sentinel, `is_root` on the resolved path, and a final normalized
/// equality comparison immediately before the destructive call. A future
/// refactor would have to break all three to delete the root.
pub struct DeleteFolderTool {
    workspace: Workspace,
}

impl DeleteFolderTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn delete(&self, path: &str) -> Result<serde_json::Value, String> {
        if path == "." || path == "./" {
            return Err(ROOT_GUARD.to_string());
        }

        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;
        if self.workspace.is_root(&resolved) {
            return Err(ROOT_GUARD.to_string());
        }

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| format!("Failed to delete folder '{path}': {e}"))?;
        if !metadata.is_dir() {
            return Err(format!("'{path}' is a file, use delete_file instead"));
        }

        if normalize_path(&resolved) == normalize_path(self.workspace.root()) {
            return Err(ROOT_GUARD.to_string());
        }
        fs::remove_dir_all(&resolved)
            .await
            .map_err(|e| format!("Failed to delete folder '{path}': {e}"))?;

        Ok(json!({ "path": self.workspace.relative(&resolved), "deleted": true }))
    }
}

#[async_trait]
impl Tool for DeleteFolderTool {
    fn name(&self) -> &str {
        "delete_folder"
    }

    fn description(&self) -> &str {
        "Recursively delete a folder and everything in it. The project root itself cannot be deleted"
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

        match self.delete(path).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deletes_folder_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/inner")).await.unwrap();
        fs::write(dir.path().join("sub/inner/f.txt"), "x").await.unwrap();

        let tool = DeleteFolderTool::new(Workspace::new(dir.path()));
        let result = tool.execute(json!({"path": "sub"})).await.unwrap();

        assert!(result.success);
        assert!(fs::metadata(dir.path().join("sub")).await.is_err());
    }

    #[tokio::test]
    async fn dot_sentinel_never_reaches_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("canary.txt"), "alive").await.unwrap();

        let tool = DeleteFolderTool::new(Workspace::new(dir.path()));
        for input in [".", "./"] {
            let result = tool.execute(json!({"path": input})).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.error.unwrap(), ROOT_GUARD);
        }
        assert!(fs::metadata(dir.path().join("canary.txt")).await.is_ok());
    }

    #[tokio::test]
    async fn absolute_root_path_is_also_blocked() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("canary.txt"), "alive").await.unwrap();

        let tool = DeleteFolderTool::new(Workspace::new(dir.path()));
        let result = tool
            .execute(json!({"path": dir.path().to_string_lossy()}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.unwrap(), ROOT_GUARD);
        assert!(fs::metadata(dir.path().join("canary.txt")).await.is_ok());
    }

    #[tokio::test]
    async fn root_via_traversal_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = DeleteFolderTool::new(Workspace::new(dir.path()));
        let result = tool.execute(json!({"path": "sub/.."})).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.error.unwrap(), ROOT_GUARD);
    }

    #[tokio::test]
    async fn file_target_is_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "x").await.unwrap();

        let tool = DeleteFolderTool::new(Workspace::new(dir.path()));
        let result = tool.execute(json!({"path": "f.txt"})).await.unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("delete_file"));
    }
}
