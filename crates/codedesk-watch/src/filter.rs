use std::path::Path;

/// Directory and file names whose changes are noise for a code editor:
/// VCS metadata, dependency trees, build output and tooling caches.
const IGNORED_NAMES: [&str; 9] = [
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    ".cache",
    "__pycache__",
    ".DS_Store",
];

/// Returns true if any component of the path is on the ignore list.
pub fn is_ignored(path: &Path) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .map(|name| IGNORED_NAMES.contains(&name))
            .unwrap_or(false)
    })
}
