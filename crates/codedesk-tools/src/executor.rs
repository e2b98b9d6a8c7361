use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use codedesk_core::{
    normalize_tool_name, Tool, ToolCall, ToolError, ToolExecutor, ToolRegistry, ToolResult,
    ToolSchema,
};

use crate::command::{CommandEngine, PromptRules};
use crate::sandbox::Workspace;
use crate::tools::{
    AppendFileTool, CheckCommandStatusTool, CopyFileTool, CopyFolderTool, CreateFolderTool,
    DeleteFileTool, DeleteFolderTool, ExistsTool, GetInfoTool, GetSystemInfoTool, ListFolderTool,
    MoveFileTool, MoveFolderTool, ReadFileTool, RunCommandTool, SearchFilesTool,
    SendCommandInputTool, TerminateCommandTool, WriteFileTool,
};

/// Names of all tools registered by [`WorkspaceToolExecutor`].
pub const TOOL_NAMES: [&str; 19] = [
    "read_file",
    "write_file",
    "append_file",
    "delete_file",
    "copy_file",
    "move_file",
    "create_folder",
    "delete_folder",
    "list_folder",
    "copy_folder",
    "move_folder",
    "exists",
    "get_info",
    "search_files",
    "get_system_info",
    "run_command",
    "check_command_status",
    "send_command_input",
    "terminate_command",
];

/// Maps historical tool names onto their current equivalents.
pub fn normalize_tool_ref(name: &str) -> &str {
    match name {
        "execute_command" => "run_command",
        "file_exists" => "exists",
        name => name,
    }
}

/// Returns true if the name refers to one of the built-in tools.
pub fn is_builtin_tool(name: &str) -> bool {
    TOOL_NAMES.contains(&normalize_tool_ref(name))
}

/// The full built-in tool set bound to one project root.
///
/// Filesystem tools share the sandbox, command tools share the engine. The
/// engine is exposed so the host can drive the approval flow for commands
/// the tools register.
pub struct WorkspaceToolExecutor {
    registry: ToolRegistry,
    engine: Arc<CommandEngine>,
}

impl WorkspaceToolExecutor {
    pub fn builder(project_root: impl AsRef<Path>) -> WorkspaceToolExecutorBuilder {
        WorkspaceToolExecutorBuilder::new(project_root)
    }

    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, ToolError> {
        Self::builder(project_root).build()
    }

    /// The engine backing run_command and friends.
    pub fn engine(&self) -> Arc<CommandEngine> {
        self.engine.clone()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[async_trait]
impl ToolExecutor for WorkspaceToolExecutor {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let name = normalize_tool_name(&call.function.name);
        let name = normalize_tool_ref(name);

        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let args: serde_json::Value = if call.function.arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                ToolError::InvalidArguments(format!("Arguments are not valid JSON: {e}"))
            })?
        };

        log::info!("executing tool '{}'", name);
        tool.execute(args).await
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        self.registry.list_tools()
    }
}

/// Builder for [`WorkspaceToolExecutor`].
///
/// Lets the host swap in its own engine (to share one approval queue across
/// executors) or custom prompt rules, and add extra tools on top of the
/// built-in set.
pub struct WorkspaceToolExecutorBuilder {
    workspace: Workspace,
    engine: Option<Arc<CommandEngine>>,
    prompt_rules: Option<PromptRules>,
    extra_tools: Vec<Arc<dyn Tool>>,
}

impl WorkspaceToolExecutorBuilder {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            workspace: Workspace::new(project_root.as_ref()),
            engine: None,
            prompt_rules: None,
            extra_tools: Vec::new(),
        }
    }

    pub fn engine(mut self, engine: Arc<CommandEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn prompt_rules(mut self, rules: PromptRules) -> Self {
        self.prompt_rules = Some(rules);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.extra_tools.push(tool);
        self
    }

    pub fn build(self) -> Result<WorkspaceToolExecutor, ToolError> {
        let engine = self.engine.unwrap_or_else(|| {
            let rules = self.prompt_rules.unwrap_or_default();
            Arc::new(CommandEngine::with_rules(rules))
        });
        let ws = self.workspace;

        let registry = ToolRegistry::new();
        let register = |tool: Arc<dyn Tool>| {
            registry
                .register_shared(tool)
                .map_err(|e| ToolError::Execution(e.to_string()))
        };

        register(Arc::new(ReadFileTool::new(ws.clone())))?;
        register(Arc::new(WriteFileTool::new(ws.clone())))?;
        register(Arc::new(AppendFileTool::new(ws.clone())))?;
        register(Arc::new(DeleteFileTool::new(ws.clone())))?;
        register(Arc::new(CopyFileTool::new(ws.clone())))?;
        register(Arc::new(MoveFileTool::new(ws.clone())))?;
        register(Arc::new(CreateFolderTool::new(ws.clone())))?;
        register(Arc::new(DeleteFolderTool::new(ws.clone())))?;
        register(Arc::new(ListFolderTool::new(ws.clone())))?;
        register(Arc::new(CopyFolderTool::new(ws.clone())))?;
        register(Arc::new(MoveFolderTool::new(ws.clone())))?;
        register(Arc::new(ExistsTool::new(ws.clone())))?;
        register(Arc::new(GetInfoTool::new(ws.clone())))?;
        register(Arc::new(SearchFilesTool::new(ws.clone())))?;
        register(Arc::new(GetSystemInfoTool::new(ws.clone())))?;
        register(Arc::new(RunCommandTool::new(ws.clone(), engine.clone())))?;
        register(Arc::new(CheckCommandStatusTool::new(engine.clone())))?;
        register(Arc::new(SendCommandInputTool::new(engine.clone())))?;
        register(Arc::new(TerminateCommandTool::new(engine.clone())))?;

        for tool in self.extra_tools {
            register(tool)?;
        }

        Ok(WorkspaceToolExecutor { registry, engine })
    }
}
