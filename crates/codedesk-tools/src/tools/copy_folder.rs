use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

/// Tool for recursively copying a folder.
pub struct CopyFolderTool {
    workspace: Workspace,
}

impl CopyFolderTool {
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
            .map_err(|e| format!("Failed to copy folder '{source}': {e}"))?;
        if !metadata.is_dir() {
            return Err(format!("'{source}' is a file, use copy_file instead"));
        }
        if to.starts_with(&from) {
            return Err(format!(
                "Cannot copy '{source}' into itself ('{destination}')"
            ));
        }

        let files_copied = copy_tree(from.clone(), to.clone()).await?;

        Ok(json!({
            "source": self.workspace.relative(&from),
            "destination": self.workspace.relative(&to),
            "files_copied": files_copied,
        }))
    }
}

fn copy_tree(
    from: PathBuf,
    to: PathBuf,
) -> Pin<Box<dyn Future<Output = Result<u64, String>> + Send>> {
    Box::pin(async move {
        fs::create_dir_all(&to)
            .await
            .map_err(|e| format!("Failed to create folder '{}': {e}", to.display()))?;

        let mut dir = fs::read_dir(&from)
            .await
            .map_err(|e| format!("Failed to read folder '{}': {e}", from.display()))?;

        let mut files_copied = 0u64;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read folder '{}': {e}", from.display()))?
        {
            let source = entry.path();
            let target = to.join(entry.file_name());
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| format!("Failed to stat '{}': {e}", source.display()))?;

            if metadata.is_dir() {
                files_copied += copy_tree(source, target).await?;
            } else {
                fs::copy(&source, &target)
                    .await
                    .map_err(|e| format!("Failed to copy '{}': {e}", source.display()))?;
                files_copied += 1;
            }
        }
        Ok(files_copied)
    })
}

#[async_trait]
impl Tool for CopyFolderTool {
    fn name(&self) -> &str {
        "copy_folder"
    }

    fn description(&self) -> &str {
        "Recursively copy a folder and its contents to a new location inside the project"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Path of the folder to copy"
                },
                "destination": {
                    "type": "string",
                    "description": "Path to copy the folder to"
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
