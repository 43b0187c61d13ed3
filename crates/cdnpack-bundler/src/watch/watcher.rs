//! Recursive file system observer for one source root.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::error::WatchError;

/// Capacity of the change channel of one watcher.
const CHANGE_BUFFER: usize = 100;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path.to_path_buf())),
            EventKind::Modify(_) => Some(FileChange::Modified(path.to_path_buf())),
            EventKind::Remove(_) => Some(FileChange::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

/// Watches a directory recursively and sends every create, modify and
/// remove event through a channel.
///
/// Nothing is filtered or debounced. Dropping the watcher stops the
/// observation and closes the channel.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl SourceWatcher {
    /// Start watching `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not an existing directory or the platform watcher
    /// cannot be attached.
    pub fn new(root: impl Into<PathBuf>) -> Result<(Self, mpsc::Receiver<FileChange>), WatchError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(WatchError::MissingRoot(root));
        }

        let (tx, rx) = mpsc::channel(CHANGE_BUFFER);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in &event.paths {
                    if let Some(change) = FileChange::from_event(&event.kind, path) {
                        // receiver gone means the coordinator stopped
                        let _ = tx.blocking_send(change);
                    }
                }
            }
            Err(error) => tracing::warn!(%error, "file watcher error"),
        })
        .map_err(|error| WatchError::Notify {
            root: root.clone(),
            error,
        })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|error| WatchError::Notify {
                root: root.clone(),
                error,
            })?;

        tracing::debug!(root = %root.display(), "watching");

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
