use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;
use tokio::fs;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::modified_rfc3339;

/// Tool for listing the contents of a folder, optionally recursively.
pub struct ListFolderTool {
    workspace: Workspace,
}

impl ListFolderTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn list(&self, path: &str, recursive: bool) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| format!("Failed to list folder '{path}': {e}"))?;
        if !metadata.is_dir() {
            return Err(format!("'{path}' is a file, use read_file instead"));
        }

        let entries = collect_entries(&self.workspace, resolved.clone(), recursive).await?;
        Ok(json!({
            "path": self.workspace.relative(&resolved),
            "entries": entries,
        }))
    }
}

fn collect_entries(
    workspace: &Workspace,
    folder: PathBuf,
    recursive: bool,
) -> Pin<Box<dyn Future<Output = Result<Vec<serde_json::Value>, String>> + Send + '_>> {
    Box::pin(async move {
        let mut dir = fs::read_dir(&folder)
            .await
            .map_err(|e| format!("Failed to read folder '{}': {e}", folder.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read folder '{}': {e}", folder.display()))?
        {
            let entry_path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Entries that vanish mid-listing are skipped, not fatal.
                Err(_) => continue,
            };

            let mut item = json!({
                "name": name,
                "path": workspace.relative(&entry_path),
                "type": if metadata.is_dir() { "folder" } else { "file" },
            });
            if let Some(modified) = modified_rfc3339(&metadata) {
                item["modified"] = json!(modified);
            }
            if metadata.is_dir() {
                if recursive {
                    item["children"] = json!(collect_entries(workspace, entry_path, true).await?);
                }
            } else {
                item["size"] = json!(metadata.len());
            }
            entries.push(item);
        }

        entries.sort_by(|a, b| {
            let a = a["name"].as_str().unwrap_or_default();
            let b = b["name"].as_str().unwrap_or_default();
            a.cmp(b)
        });
        Ok(entries)
    })
}

#[async_trait]
impl Tool for ListFolderTool {
    fn name(&self) -> &str {
        "list_folder"
    }

    fn description(&self) -> &str {
        "List the files and folders inside a folder, optionally recursing into subfolders"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the folder, relative to the project root. Defaults to the root"
                },
                "recursive": {
                    "type": "boolean",
                    "description": "Include the contents of subfolders as nested children",
                    "default": false
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let recursive = args
            .get("recursive")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        match self.list(path, recursive).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
