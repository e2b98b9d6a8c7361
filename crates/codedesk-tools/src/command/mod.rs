//! Shell command execution with a human-in-the-loop approval gate.

pub mod ansi;
pub mod engine;
pub mod prompt;

pub use ansi::strip_ansi;
pub use engine::{
    CommandEngine, CommandError, CommandOutcome, CommandStatus, ExecutionEvent, ExecutionSnapshot,
};
pub use prompt::PromptRules;
