use std::sync::Arc;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;

use crate::command::CommandEngine;
use crate::sandbox::Workspace;
use crate::tools::required_str;

/// Tool that registers a shell command for approval.
///
/// The command is NOT executed here. It is parked in the engine as pending
/// and only runs once the host calls `CommandEngine::approve`, so a model
/// can never bypass the approval gate through this tool.
pub struct RunCommandTool {
    workspace: Workspace,
    engine: Arc<CommandEngine>,
}

impl RunCommandTool {
    pub fn new(workspace: Workspace, engine: Arc<CommandEngine>) -> Self {
        Self { workspace, engine }
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Request execution of a shell command. The command waits for user approval before it runs"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to run"
                },
                "description": {
                    "type": "string",
                    "description": "One line explaining what the command does and why"
                },
                "cwd": {
                    "type": "string",
                    "description": "Working directory, relative to the project root. Defaults to the root"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = required_str(&args, "command")?;
        let description = args.get("description").and_then(|v| v.as_str());
        let cwd = args.get("cwd").and_then(|v| v.as_str());

        match self
            .engine
            .prepare(command, self.workspace.root(), cwd)
            .await
        {
            Ok(snapshot) => Ok(ToolResult::ok(json!({
                "command_id": snapshot.id,
                "status": snapshot.status,
                "command": snapshot.command,
                "description": description,
            }))),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandStatus;

    #[tokio::test]
    async fn registers_pending_without_running() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(CommandEngine::new());
        let tool = RunCommandTool::new(Workspace::new(dir.path()), engine.clone());

        let result = tool
            .execute(json!({"command": "echo hi", "description": "say hi"}))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        let id = data["command_id"].as_str().unwrap();
        assert_eq!(data["status"], "pending");
        assert_eq!(data["description"], "say hi");

        let snapshot = engine.status(id).await.unwrap();
        assert_eq!(snapshot.status, CommandStatus::Pending);
        assert!(snapshot.output.is_empty());
    }

    #[tokio::test]
    async fn cwd_outside_project_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(CommandEngine::new());
        let tool = RunCommandTool::new(Workspace::new(dir.path()), engine);

        let result = tool
            .execute(json!({"command": "ls", "cwd": "../.."}))
            .await
            .unwrap();
        assert!(!result.success);
    }
}
