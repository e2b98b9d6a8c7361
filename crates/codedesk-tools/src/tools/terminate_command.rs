use std::sync::Arc;

use async_trait::async_trait;
use codedesk_core::{Tool, ToolError, ToolResult};
use serde_json::json;

use crate::command::CommandEngine;
use crate::tools::required_str;

/// Tool for killing a running command.
pub struct TerminateCommandTool {
    engine: Arc<CommandEngine>,
}

impl TerminateCommandTool {
    pub fn new(engine: Arc<CommandEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for TerminateCommandTool {
    fn name(&self) -> &str {
        "terminate_command"
    }

    fn description(&self) -> &str {
        "Forcibly stop a running command"
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

        match self.engine.terminate(command_id).await {
            Ok(snapshot) => {
                let data = serde_json::to_value(&snapshot)
                    .map_err(|e| ToolError::Execution(e.to_string()))?;
                Ok(ToolResult::ok(data))
            }
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}
