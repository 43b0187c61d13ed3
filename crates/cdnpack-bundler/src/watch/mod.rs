//! Development-mode rebuilds.
//!
//! [`SourceWatcher`] turns file system notifications for one root into a
//! stream of [`FileChange`]s; [`WatchCoordinator`] consumes one such stream
//! per bundle and rebuilds that bundle alone, reporting every outcome as a
//! [`WatchEvent`].

mod coordinator;
mod watcher;

pub use coordinator::{BundleWatch, Trigger, WatchCoordinator, WatchEvent, WatchState};
pub use watcher::{FileChange, SourceWatcher};
