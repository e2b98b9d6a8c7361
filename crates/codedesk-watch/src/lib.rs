//! Recursive file-change watching for open projects.
//!
//! One OS-level watcher per project root, with noisy paths (VCS metadata,
//! dependency trees, build output) filtered out and rapid repeats per path
//! debounced before anything reaches the UI channel.

mod filter;
mod watcher;

pub use filter::is_ignored;
pub use watcher::{FileChangeEvent, WatchError, WatcherManager};
