//! Per-bundle rebuild loops.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::watcher::{FileChange, SourceWatcher};
use crate::builder::{BuildResult, BundleBuilder};
use crate::error::{BuildError, WatchError};
use crate::registry::{BundleDescriptor, BundleRegistry};

/// What started a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// First build after the bundle was attached
    Initial,
    /// A file under the bundle's root changed
    Change(PathBuf),
}

/// Notifications emitted by a [`WatchCoordinator`].
#[derive(Debug)]
pub enum WatchEvent {
    BuildStarted { bundle: String, trigger: Trigger },
    BuildCompleted(BuildResult),
    BuildFailed { bundle: String, error: BuildError },
    /// The bundle's root could not be observed; it will not be rebuilt
    WatcherFailed { bundle: String, error: WatchError },
}

impl WatchEvent {
    /// Name of the bundle the event is about.
    pub fn bundle(&self) -> &str {
        match self {
            Self::BuildStarted { bundle, .. }
            | Self::BuildFailed { bundle, .. }
            | Self::WatcherFailed { bundle, .. } => bundle,
            Self::BuildCompleted(result) => &result.bundle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Building,
}

/// Handle on one attached bundle.
#[derive(Debug, Clone)]
pub struct BundleWatch {
    descriptor: Arc<BundleDescriptor>,
    in_flight: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl BundleWatch {
    fn new(descriptor: Arc<BundleDescriptor>) -> Self {
        Self {
            descriptor,
            in_flight: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn descriptor(&self) -> &Arc<BundleDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// `Building` while at least one build of this bundle is running.
    pub fn state(&self) -> WatchState {
        if self.in_flight.load(Ordering::SeqCst) == 0 {
            WatchState::Idle
        } else {
            WatchState::Building
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Number of builds started since the bundle was attached.
    pub fn builds_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

/// Rebuilds each attached bundle whenever its change source reports a
/// change.
///
/// Bundles are independent: a change only rebuilds the bundle whose source
/// reported it, and a failed build is reported as an event and never stops
/// the loop. Overlapping builds of the same bundle are allowed; the last
/// one to finish wins.
#[derive(Debug)]
pub struct WatchCoordinator {
    builder: BundleBuilder,
    events: mpsc::UnboundedSender<WatchEvent>,
    initial_build: bool,
    watchers: Mutex<Vec<SourceWatcher>>,
    bundles: Mutex<Vec<BundleWatch>>,
}

impl WatchCoordinator {
    pub fn new(builder: BundleBuilder) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                builder,
                events,
                initial_build: true,
                watchers: Mutex::new(Vec::new()),
                bundles: Mutex::new(Vec::new()),
            },
            rx,
        )
    }

    /// Whether attaching a bundle builds it once right away (default `true`).
    pub fn initial_build(mut self, enabled: bool) -> Self {
        self.initial_build = enabled;
        self
    }

    /// Watch every bundle of `registry` through the file system.
    ///
    /// A root that cannot be observed is reported as
    /// [`WatchEvent::WatcherFailed`]; the other bundles are still watched.
    pub fn watch_registry(
        builder: BundleBuilder,
        registry: &BundleRegistry,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (coordinator, rx) = Self::new(builder);
        for descriptor in registry.iter() {
            if let Err(error) = coordinator.watch(descriptor.clone()) {
                tracing::warn!(bundle = %descriptor.name, %error, "cannot watch bundle");
                let _ = coordinator.events.send(WatchEvent::WatcherFailed {
                    bundle: descriptor.name.clone(),
                    error,
                });
            }
        }
        (coordinator, rx)
    }

    /// Watch `descriptor.root` recursively and rebuild on every change.
    pub fn watch(&self, descriptor: Arc<BundleDescriptor>) -> Result<BundleWatch, WatchError> {
        let (watcher, changes) = SourceWatcher::new(descriptor.root.clone())?;
        self.watchers.lock().push(watcher);
        Ok(self.attach(descriptor, changes))
    }

    /// Rebuild `descriptor` for every change received on `changes`.
    ///
    /// The loop ends when `changes` closes.
    pub fn attach(
        &self,
        descriptor: Arc<BundleDescriptor>,
        changes: mpsc::Receiver<FileChange>,
    ) -> BundleWatch {
        let watch = BundleWatch::new(descriptor);
        self.bundles.lock().push(watch.clone());

        tokio::spawn(drive(
            self.builder.clone(),
            watch.clone(),
            changes,
            self.events.clone(),
            self.initial_build,
        ));
        watch
    }

    /// Every bundle attached so far, in attach order.
    pub fn bundles(&self) -> Vec<BundleWatch> {
        self.bundles.lock().clone()
    }
}

async fn drive(
    builder: BundleBuilder,
    watch: BundleWatch,
    mut changes: mpsc::Receiver<FileChange>,
    events: mpsc::UnboundedSender<WatchEvent>,
    initial_build: bool,
) {
    if initial_build {
        start_build(&builder, &watch, &events, Trigger::Initial);
    }

    while let Some(change) = changes.recv().await {
        tracing::debug!(bundle = %watch.name(), path = %change.path().display(), "change detected");
        start_build(
            &builder,
            &watch,
            &events,
            Trigger::Change(change.path().to_path_buf()),
        );
    }

    tracing::debug!(bundle = %watch.name(), "change source closed");
}

fn start_build(
    builder: &BundleBuilder,
    watch: &BundleWatch,
    events: &mpsc::UnboundedSender<WatchEvent>,
    trigger: Trigger,
) {
    watch.in_flight.fetch_add(1, Ordering::SeqCst);
    watch.started.fetch_add(1, Ordering::SeqCst);
    let _ = events.send(WatchEvent::BuildStarted {
        bundle: watch.name().to_string(),
        trigger,
    });

    let build = builder.spawn(Arc::clone(&watch.descriptor));
    let watch = watch.clone();
    let events = events.clone();
    tokio::spawn(async move {
        let outcome = build.await;

        // Idle must be observable by the time the event arrives
        watch.in_flight.fetch_sub(1, Ordering::SeqCst);

        let event = match outcome {
            Ok(result) => {
                tracing::info!(bundle = %result.bundle, output = %result.output.display(), "rebuilt");
                WatchEvent::BuildCompleted(result)
            }
            Err(error) => {
                tracing::warn!(bundle = %watch.name(), %error, "rebuild failed");
                WatchEvent::BuildFailed {
                    bundle: watch.name().to_string(),
                    error,
                }
            }
        };
        let _ = events.send(event);
    });
}
