use std::sync::Arc;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;

use crate::command::CommandEngine;
use crate::tools::required_str;

/// Tool for answering an interactive prompt on a running command's stdin.
pub struct SendCommandInputTool {
    engine: Arc<CommandEngine>,
}

impl SendCommandInputTool {
    pub fn new(engine: Arc<CommandEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for SendCommandInputTool {
    fn name(&self) -> &str {
        "send_command_input"
    }

    fn description(&self) -> &str {
        "Send a line of input to a running command that is waiting on an interactive prompt"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command_id": {
                    "type": "string",
                    "description": "Identifier returned by run_command"
                },
                "input": {
                    "type": "string",
                    "description": "Text to write to the command's stdin. A newline is appended"
                }
            },
            "required": ["command_id", "input"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command_id = required_str(&args, "command_id")?;
        let input = required_str(&args, "input")?;

        match self.engine.send_input(command_id, input).await {
            Ok(()) => Ok(ToolResult::ok(json!({
                "command_id": command_id,
                "input_sent": true,
            }))),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Workspace;

    #[tokio::test]
    async fn input_to_non_running_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let engine = Arc::new(CommandEngine::new());

        let snapshot = engine
            .prepare("cat", workspace.root(), None)
            .await
            .unwrap();

        let tool = SendCommandInputTool::new(engine);
        let result = tool
            .execute(json!({"command_id": snapshot.id, "input": "hello"}))
            .await
            .unwrap();

        // Still pending, never approved.
        assert!(!result.success);
    }

    #[tokio::test]
    async fn input_reaches_a_running_command() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let engine = Arc::new(CommandEngine::new());

        let snapshot = engine
            .prepare("read line; echo \"got $line\"", workspace.root(), None)
            .await
            .unwrap();
        let id = snapshot.id.clone();

        let input_engine = engine.clone();
        let input_id = id.clone();
        tokio::spawn(async move {
            let tool = SendCommandInputTool::new(input_engine.clone());
            // Wait for the command to reach running before writing.
            for _ in 0..100 {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                if let Ok(snapshot) = input_engine.status(&input_id).await {
                    if snapshot.status == crate::command::CommandStatus::Running {
                        break;
                    }
                }
            }
            let result = tool
                .execute(json!({"command_id": input_id, "input": "hello"}))
                .await
                .unwrap();
            assert!(result.success);
        });

        let outcome = engine.approve(&id).await.unwrap();
        assert!(outcome.output.contains("got hello"));
    }
}
