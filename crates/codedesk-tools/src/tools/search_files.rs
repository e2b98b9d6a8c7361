use std::path::PathBuf;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use regex::RegexBuilder;
use serde_json::json;
use walkdir::WalkDir;

use crate::sandbox::{Workspace, SANDBOX_VIOLATION};
use crate::tools::required_str;

const DEFAULT_MAX_DEPTH: usize = 10;

/// Tool for finding files by name pattern.
///
/// Patterns are simple globs: `*` matches any run of characters within a
/// name, everything else matches literally and case-insensitively. The match
/// applies to the file name only, not the full path.
pub struct SearchFilesTool {
    workspace: Workspace,
}

impl SearchFilesTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    async fn search(
        &self,
        pattern: &str,
        path: &str,
        max_depth: usize,
        include_hidden: bool,
    ) -> Result<serde_json::Value, String> {
        let resolved = self
            .workspace
            .resolve(path)
            .ok_or_else(|| SANDBOX_VIOLATION.to_string())?;

        let matcher = glob_to_regex(pattern)?;
        let workspace = self.workspace.clone();
        let pattern = pattern.to_string();

        // Directory walking is synchronous, keep it off the async runtime.
        let result = tokio::task::spawn_blocking(move || {
            walk(&workspace, &resolved, &matcher, max_depth, include_hidden)
        })
        .await
        .map_err(|e| format!("Search task failed: {e}"))?;

        let matches = result?;
        Ok(json!({
            "pattern": pattern,
            "count": matches.len(),
            "matches": matches,
        }))
    }
}

fn glob_to_regex(pattern: &str) -> Result<regex::Regex, String> {
    let literal_parts: Vec<String> = pattern.split('*').map(|p| regex::escape(p)).collect();
    let source = format!("^{}$", literal_parts.join(".*"));

    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|e| format!("Invalid pattern '{pattern}': {e}"))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk(
    workspace: &Workspace,
    root: &PathBuf,
    matcher: &regex::Regex,
    max_depth: usize,
    include_hidden: bool,
) -> Result<Vec<serde_json::Value>, String> {
    if !root.is_dir() {
        return Err(format!("'{}' is not a folder", workspace.relative(root)));
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| include_hidden || !is_hidden(entry));

    // Unreadable entries are skipped silently.
    for entry in walker.flatten() {
        let name = entry.file_name().to_string_lossy();
        if matcher.is_match(&name) {
            matches.push(json!({
                "name": name,
                "path": workspace.relative(entry.path()),
                "type": if entry.file_type().is_dir() { "folder" } else { "file" },
            }));
        }
    }

    matches.sort_by(|a, b| {
        let a = a["path"].as_str().unwrap_or_default();
        let b = b["path"].as_str().unwrap_or_default();
        a.cmp(b)
    });
    Ok(matches)
}

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Find files and folders whose name matches a glob pattern, e.g. '*.ts' or 'test_*'"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Name pattern. '*' matches any run of characters"
                },
                "path": {
                    "type": "string",
                    "description": "Folder to search in, relative to the project root. Defaults to the root"
                },
                "max_depth": {
                    "type": "integer",
                    "description": "How many folder levels to descend",
                    "default": DEFAULT_MAX_DEPTH
                },
                "include_hidden": {
                    "type": "boolean",
                    "description": "Also search inside dot-prefixed files and folders",
                    "default": false
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let pattern = required_str(&args, "pattern")?;
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let max_depth = args
            .get("max_depth")
            .and_then(|v| v.as_u64())
            .map(|d| d as usize)
            .unwrap_or(DEFAULT_MAX_DEPTH);
        let include_hidden = args
            .get("include_hidden")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        match self.search(pattern, path, max_depth, include_hidden).await {
            Ok(data) => Ok(ToolResult::ok(data)),
            Err(e) => Ok(ToolResult::error(e)),
        }
    }
}
