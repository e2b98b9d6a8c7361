//! Path sandbox: every filesystem and command operation resolves its paths
//! through here before touching disk.
//!
//! Resolution is purely lexical. Traversal components are collapsed before
//! the containment check, so `"../../etc/passwd"` can never slip through via
//! string tricks, and no filesystem access (stat, canonicalize) is needed.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Error message surfaced for any sandbox violation.
pub const SANDBOX_VIOLATION: &str = "Path is outside project directory";

/// Error message surfaced when an operation targets the project root itself.
pub const ROOT_GUARD: &str = "Refusing to modify the project root directory";

/// Collapses `.` and `..` components without consulting the filesystem.
///
/// On an absolute path, `..` at the root is dropped ("/.." stays "/").
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolves a tool-supplied path against the project root.
///
/// Returns `None` when the input is empty, the root is empty, or the
/// normalized result escapes the root. `"."` designates the root itself.
/// The containment check is component-wise, so `/proj` does not admit
/// `/project2`.
pub fn resolve_workspace_path(input: &str, project_root: &Path) -> Option<PathBuf> {
    if input.is_empty() || project_root.as_os_str().is_empty() {
        return None;
    }

    let root = normalize_path(project_root);
    let candidate = if input == "." {
        root.clone()
    } else {
        let path = Path::new(input);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    };

    let resolved = normalize_path(&candidate);
    if resolved == root || resolved.starts_with(&root) {
        Some(resolved)
    } else {
        None
    }
}

/// True when `path` resolves to exactly the project root.
///
/// Used as an extra guard in front of destructive folder operations, on top
/// of the generic containment check.
pub fn is_project_root(path: &Path, project_root: &Path) -> bool {
    normalize_path(path) == normalize_path(project_root)
}

/// Immutable handle on one sandboxed project directory.
///
/// Cloning is cheap; every tool bound to the same session shares the same
/// root for the session's lifetime.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: Arc<PathBuf>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(normalize_path(&root.into())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sandbox-resolves a tool-supplied path, `None` on violation.
    pub fn resolve(&self, input: &str) -> Option<PathBuf> {
        resolve_workspace_path(input, &self.root)
    }

    /// True when the given path is the project root itself.
    pub fn is_root(&self, path: &Path) -> bool {
        is_project_root(path, &self.root)
    }

    /// Renders a resolved path relative to the root, for display in results.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.root())
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}
