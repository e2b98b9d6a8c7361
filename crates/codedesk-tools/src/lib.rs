//! Built-in agent tools bound to a sandboxed project directory.
//!
//! Three layers live here:
//! - [`sandbox`]: lexical path containment for everything that touches disk.
//! - [`command`]: the approval-gated shell command engine.
//! - [`tools`]: the individual tool implementations, wired together by
//!   [`WorkspaceToolExecutor`].

pub mod command;
pub mod sandbox;
pub mod tools;

mod executor;

pub use executor::{
    is_builtin_tool, normalize_tool_ref, WorkspaceToolExecutor, WorkspaceToolExecutorBuilder,
    TOOL_NAMES,
};
pub use sandbox::Workspace;
