//! Core tool abstractions for the codedesk agent runtime.
//!
//! Everything an LLM function-calling layer needs to talk to the tool
//! subsystem lives here: the `Tool` trait, the registry, the uniform
//! `ToolResult` envelope and the executor boundary. The concrete filesystem
//! and command tools live in `codedesk-tools`.

pub mod tools;

pub use tools::{
    FunctionCall, FunctionSchema, RegistryError, SharedTool, Tool, ToolCall, ToolError,
    ToolExecutor, ToolRegistry, ToolResult, ToolSchema, normalize_tool_name,
};
