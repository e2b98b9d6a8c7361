use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::filter::is_ignored;

/// Events for the same path closer together than this collapse to one.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// A debounced, filtered change notification for one path.
#[derive(Debug, Clone, Serialize)]
pub struct FileChangeEvent {
    /// Platform-dependent kind label; treat as opaque.
    pub kind: String,
    pub path: PathBuf,
    pub project_root: PathBuf,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to watch '{path}': {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },
}

fn kind_label(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Create(_) => "created",
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => "renamed",
        EventKind::Modify(_) => "changed",
        EventKind::Remove(_) => "removed",
        _ => "other",
    }
}

/// Owns the active filesystem watchers, one per project root.
///
/// The underlying `notify` watcher delivers raw events on its own thread;
/// filtering and debouncing happen there, accepted events are pushed onto
/// the unbounded channel the caller handed in. Dropping the stored watcher
/// releases the OS resources.
pub struct WatcherManager {
    watchers: DashMap<PathBuf, RecommendedWatcher>,
}

impl WatcherManager {
    pub fn new() -> Self {
        Self {
            watchers: DashMap::new(),
        }
    }

    /// Starts watching `project_root` recursively.
    ///
    /// Watching a root that is already watched replaces the previous
    /// watcher (and its channel) rather than duplicating events.
    pub fn watch(
        &self,
        project_root: impl AsRef<Path>,
        tx: UnboundedSender<FileChangeEvent>,
    ) -> Result<(), WatchError> {
        let root = project_root.as_ref().to_path_buf();

        let event_root = root.clone();
        let recently_sent: Mutex<HashMap<PathBuf, Instant>> = Mutex::new(HashMap::new());
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("watch error under '{}': {}", event_root.display(), e);
                        return;
                    }
                };
                let kind = kind_label(&event.kind);
                for path in event.paths {
                    if is_ignored(&path) {
                        continue;
                    }
                    if let Ok(mut seen) = recently_sent.lock() {
                        let now = Instant::now();
                        if let Some(last) = seen.get(&path) {
                            if now.duration_since(*last) < DEBOUNCE_WINDOW {
                                continue;
                            }
                        }
                        seen.insert(path.clone(), now);
                        seen.retain(|_, at| now.duration_since(*at) < DEBOUNCE_WINDOW);
                    }
                    let _ = tx.send(FileChangeEvent {
                        kind: kind.to_string(),
                        path,
                        project_root: event_root.clone(),
                    });
                }
            },
            Config::default(),
        )
        .map_err(|source| WatchError::Watch {
            path: root.clone(),
            source,
        })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: root.clone(),
                source,
            })?;

        log::info!("watching '{}'", root.display());
        self.watchers.insert(root, watcher);
        Ok(())
    }

    /// Stops watching a root. Stopping an unwatched root is a no-op.
    pub fn stop_watching(&self, project_root: impl AsRef<Path>) {
        if self.watchers.remove(project_root.as_ref()).is_some() {
            log::info!("stopped watching '{}'", project_root.as_ref().display());
        }
    }

    /// Releases every active watcher.
    pub fn stop_all(&self) {
        let count = self.watchers.len();
        self.watchers.clear();
        if count > 0 {
            log::info!("stopped {} watcher(s)", count);
        }
    }

    pub fn is_watching(&self, project_root: impl AsRef<Path>) -> bool {
        self.watchers.contains_key(project_root.as_ref())
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

impl Default for WatcherManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn stop_watching_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WatcherManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        manager.watch(dir.path(), tx).unwrap();
        assert!(manager.is_watching(dir.path()));

        manager.stop_watching(dir.path());
        assert!(!manager.is_watching(dir.path()));
        // Second stop of the same path must be a silent no-op.
        manager.stop_watching(dir.path());
        assert!(!manager.is_watching(dir.path()));
    }

    #[test]
    fn rewatching_replaces_the_previous_watcher() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WatcherManager::new();

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        manager.watch(dir.path(), tx1).unwrap();
        manager.watch(dir.path(), tx2).unwrap();

        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn stop_all_releases_everything() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let manager = WatcherManager::new();

        let (tx, _rx) = mpsc::unbounded_channel();
        manager.watch(dir_a.path(), tx.clone()).unwrap();
        manager.watch(dir_b.path(), tx).unwrap();
        assert_eq!(manager.len(), 2);

        manager.stop_all();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn delivers_change_events_for_watched_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WatcherManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.watch(dir.path(), tx).unwrap();

        // Give the OS watcher time to arm before mutating the tree.
        tokio::time::sleep(Duration::from_millis(300)).await;
        std::fs::write(dir.path().join("watched.txt"), "change").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        assert!(event.path.ends_with("watched.txt"));
        assert_eq!(event.project_root, dir.path());
        assert!(!event.kind.is_empty());
    }

    #[tokio::test]
    async fn rapid_events_for_one_path_collapse_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WatcherManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.watch(dir.path(), tx).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        // A burst of writes well inside the debounce window.
        let file = dir.path().join("burst.txt");
        std::fs::write(&file, "one").unwrap();
        std::fs::write(&file, "two").unwrap();
        std::fs::write(&file, "three").unwrap();

        let first = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        assert!(first.path.ends_with("burst.txt"));

        // Give any straggler raw events time to be (wrongly) forwarded.
        tokio::time::sleep(DEBOUNCE_WINDOW * 3).await;
        let mut extra = 0;
        while let Ok(event) = rx.try_recv() {
            if event.path.ends_with("burst.txt") {
                extra += 1;
            }
        }
        assert_eq!(extra, 0);
    }

    #[tokio::test]
    async fn ignored_paths_are_never_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let manager = WatcherManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.watch(dir.path(), tx).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        std::fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        std::fs::write(dir.path().join("kept.txt"), "x").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("channel closed");
        // The first event that arrives must be for the kept file.
        assert!(event.path.ends_with("kept.txt"));
    }
}
