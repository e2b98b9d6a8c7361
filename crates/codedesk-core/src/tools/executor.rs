use async_trait::async_trait;
use thiserror::Error;

use crate::tools::{ToolCall, ToolResult, ToolSchema};

/// Dispatcher-level failures: the tool itself was never reached.
///
/// Operation failures (missing files, sandbox violations, bad process state)
/// are not errors at this level; they come back as `ToolResult` failures.
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError>;
    fn list_tools(&self) -> Vec<ToolSchema>;
}
