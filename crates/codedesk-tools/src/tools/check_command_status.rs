use std::sync::Arc;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;

use crate::command::CommandEngine;
use crate::tools::required_str;

/// Tool returning the full snapshot of a tracked command.
pub struct CheckCommandStatusTool {
    engine: Arc<CommandEngine>,
}

impl CheckCommandStatusTool {
    pub fn new(engine: Arc<CommandEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for CheckCommandStatusTool {
    fn name(&self) -> &str {
        "check_command_status"
    }

    fn description(&self) -> &str {
        "Get the current status, accumulated output and exit code of a previously requested command"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command_id": {
                    "type": "string",
                    "description": "Identifier returned by run_command"
                }
            },
            "required": ["command_id"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command_id = required_str(&args, "command_id")?;

        match self.engine.status(command_id).await {
            Ok(snapshot) => {
                let data = serde_json::to_value(&snapshot)
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                Ok(ToolResult::ok(data))
            }
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Workspace;

    #[tokio::test]
    async fn returns_snapshot_after_completion() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let engine = Arc::new(CommandEngine::new());

        let snapshot = engine
            .prepare("echo done", workspace.root(), None)
            .await
            .unwrap();
        engine.approve(&snapshot.id).await.unwrap();

        let tool = CheckCommandStatusTool::new(engine);
        let result = tool
            .execute(json!({"command_id": snapshot.id}))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["status"], "completed");
        assert_eq!(data["exit_code"], 0);
        assert!(data["output"].as_str().unwrap().contains("done"));
    }

    #[tokio::test]
    async fn unknown_id_is_an_error() {
        let engine = Arc::new(CommandEngine::new());
        let tool = CheckCommandStatusTool::new(engine);

        let result = tool
            .execute(json!({"command_id": "cmd_0_deadbeef"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not found"));
    }
}
