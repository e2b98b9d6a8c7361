use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;

use crate::sandbox::Workspace;

/// Tool reporting the host platform and the active project root.
pub struct GetSystemInfoTool {
    workspace: Workspace,
}

impl GetSystemInfoTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for GetSystemInfoTool {
    fn name(&self) -> &str {
        "get_system_info"
    }

    fn description(&self) -> &str {
        "Get the operating system, architecture and project root of the host"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::ok(json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "family": std::env::consts::FAMILY,
            "project_root": self.workspace.root().to_string_lossy(),
        })))
    }
}
