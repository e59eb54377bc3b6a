//! Directory change notification
//!
//! A [`ChangeNotifier`] watches directory trees and pushes [`ChangeEvent`]s
//! into a channel. Notifier threads only ever send; the scheduler drains the
//! channel on the host's thread, so all sync state is touched from there.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};

use notify::event::EventKind;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::{Error, Result};

/// Kind of change reported for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single change below a watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Identifies one watched root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Channel end a notifier delivers events into
pub type ChangeSink = Sender<ChangeEvent>;

/// Source of change notifications for directory trees.
pub trait ChangeNotifier: Send {
    /// Start watching `root` recursively, delivering events to `sink`.
    fn subscribe(&mut self, root: &Path, sink: ChangeSink) -> Result<SubscriptionHandle>;

    /// Stop watching. Unknown handles are ignored.
    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

/// Notifier backed by the platform filesystem watcher
#[derive(Default)]
pub struct FsChangeNotifier {
    next_id: u64,
    watchers: HashMap<SubscriptionHandle, RecommendedWatcher>,
}

impl FsChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeNotifier for FsChangeNotifier {
    fn subscribe(&mut self, root: &Path, sink: ChangeSink) -> Result<SubscriptionHandle> {
        let watch_error = |e: notify::Error| Error::Watch {
            path: root.to_path_buf(),
            message: e.to_string(),
        };

        let mut watcher = notify::recommended_watcher(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    let Some(kind) = change_kind(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        // The receiver is gone once the scheduler shuts down
                        let _ = sink.send(ChangeEvent { path, kind });
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Filesystem watcher error");
                }
            },
        )
        .map_err(watch_error)?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(watch_error)?;
        tracing::info!(root = %root.display(), "Watching for config changes");

        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.watchers.insert(handle, watcher);
        Ok(handle)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        // Dropping the watcher stops it
        if self.watchers.remove(&handle).is_some() {
            tracing::debug!(?handle, "Stopped watching");
        }
    }
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Added),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct HostRegistry {
    next_id: u64,
    subscriptions: Vec<(SubscriptionHandle, PathBuf, ChangeSink)>,
}

/// Notifier fed by the host application.
///
/// Clones share one registry: hand one clone to the scheduler and keep
/// another to call [`HostNotifier::notify`] when the host sees a change.
#[derive(Debug, Clone, Default)]
pub struct HostNotifier {
    registry: Arc<Mutex<HostRegistry>>,
}

impl HostNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a change to every subscription whose root contains `path`.
    ///
    /// Returns the number of subscriptions that received it.
    pub fn notify(&self, path: impl AsRef<Path>, kind: ChangeKind) -> usize {
        let path = path.as_ref();
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .subscriptions
            .iter()
            .filter(|(_, root, _)| path.starts_with(root))
            .filter(|(_, _, sink)| sink.send(ChangeEvent::new(path, kind)).is_ok())
            .count()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .len()
    }
}

impl ChangeNotifier for HostNotifier {
    fn subscribe(&mut self, root: &Path, sink: ChangeSink) -> Result<SubscriptionHandle> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = SubscriptionHandle(registry.next_id);
        registry.next_id += 1;
        registry.subscriptions.push((handle, root.to_path_buf(), sink));
        Ok(handle)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.subscriptions.retain(|(h, _, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn host_notifier_routes_by_root() {
        let mut notifier = HostNotifier::new();
        let (tx, rx) = mpsc::channel();
        notifier.subscribe(Path::new("/project/Config"), tx).unwrap();

        assert_eq!(notifier.notify("/project/Config/DefaultGame.ini", ChangeKind::Modified), 1);
        assert_eq!(notifier.notify("/project/Saved/Other.ini", ChangeKind::Modified), 0);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.path, PathBuf::from("/project/Config/DefaultGame.ini"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribed_roots_receive_nothing() {
        let mut notifier = HostNotifier::new();
        let (tx, rx) = mpsc::channel();
        let handle = notifier.subscribe(Path::new("/project/Config"), tx).unwrap();

        notifier.unsubscribe(handle);
        notifier.unsubscribe(handle);

        assert_eq!(notifier.notify("/project/Config/DefaultGame.ini", ChangeKind::Modified), 0);
        assert_eq!(notifier.subscription_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
