//! Tool implementations, one file per tool.
//!
//! Filesystem tools are bound to a [`Workspace`](crate::sandbox::Workspace)
//! and resolve every path argument through the sandbox before touching disk.
//! Command tools are thin wrappers over the shared
//! [`CommandEngine`](crate::command::CommandEngine).

mod append_file;
mod check_command_status;
mod copy_file;
mod copy_folder;
mod create_folder;
mod delete_file;
mod delete_folder;
mod exists;
mod get_info;
mod get_system_info;
mod list_folder;
mod move_file;
mod move_folder;
mod read_file;
mod run_command;
mod search_files;
mod send_command_input;
mod terminate_command;
mod write_file;

pub use append_file::AppendFileTool;
pub use check_command_status::CheckCommandStatusTool;
pub use copy_file::CopyFileTool;
pub use copy_folder::CopyFolderTool;
pub use create_folder::CreateFolderTool;
pub use delete_file::DeleteFileTool;
pub use delete_folder::DeleteFolderTool;
pub use exists::ExistsTool;
pub use get_info::GetInfoTool;
pub use get_system_info::GetSystemInfoTool;
pub use list_folder::ListFolderTool;
pub use move_file::MoveFileTool;
pub use move_folder::MoveFolderTool;
pub use read_file::ReadFileTool;
pub use run_command::RunCommandTool;
pub use search_files::SearchFilesTool;
pub use send_command_input::SendCommandInputTool;
pub use terminate_command::TerminateCommandTool;
pub use write_file::WriteFileTool;

use codedesk_core::ToolError;

/// Extracts a required string argument.
pub(crate) fn required_str<'a>(
    args: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|value| value.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' parameter")))
}

/// RFC3339 modification timestamp, if the platform exposes one.
pub(crate) fn modified_rfc3339(metadata: &std::fs::Metadata) -> Option<String> {
    metadata
        .modified()
        .ok()
        .map(|time| chrono::DateTime::<chrono::Utc>::from(time).to_rfc3339())
}
