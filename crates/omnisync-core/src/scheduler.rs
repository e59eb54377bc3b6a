//! Automatic sync scheduling
//!
//! Two strategies push local edits to the global tiers without user action:
//!
//! - **Poll**: on a fixed interval, every auto-sync entry whose project and
//!   global copies differ in size is copied to its global location.
//! - **Watch**: modification events for auto-sync entries are collected in a
//!   pending set. The first event arms a one-shot debounce timer; when it
//!   fires, a single full save pass runs and the pending set is cleared.
//!
//! The scheduler owns no thread. The host calls [`AutoSyncScheduler::pump`]
//! with the current instant, and every pass runs inside that call.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use omnisync_fs::NormalizedPath;

use crate::Result;
use crate::discovery::CONFIG_EXTENSION;
use crate::engine::{SyncDirection, SyncEngine, SyncReport};
use crate::store::SyncEntryStore;
use crate::timer::{TimerHandle, TimerQueue};
use crate::watch::{ChangeEvent, ChangeKind, ChangeNotifier, SubscriptionHandle};

/// Strategy and timing of automatic sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSyncMode {
    /// Size comparison on a fixed interval
    Poll { interval: Duration },
    /// Debounced reaction to change notifications
    Watch { debounce: Duration },
}

impl AutoSyncMode {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
    /// Longest poll interval the configuration accepts (one day)
    pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
    /// Longest debounce the configuration accepts (ten minutes)
    pub const MAX_DEBOUNCE: Duration = Duration::from_secs(10 * 60);

    pub fn poll() -> Self {
        Self::Poll {
            interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn watch() -> Self {
        Self::Watch {
            debounce: Self::DEFAULT_DEBOUNCE,
        }
    }
}

impl Default for AutoSyncMode {
    fn default() -> Self {
        Self::poll()
    }
}

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSyncState {
    /// Not scheduled
    Disabled,
    /// Scheduled, nothing waiting
    Idle,
    /// Watch mode with changes waiting for the debounce timer
    PendingFlush,
}

/// Drives poll or watch mode auto-sync
pub struct AutoSyncScheduler {
    mode: AutoSyncMode,
    notifier: Box<dyn ChangeNotifier>,
    timers: TimerQueue,
    poll_timer: Option<TimerHandle>,
    flush_timer: Option<TimerHandle>,
    subscriptions: Vec<SubscriptionHandle>,
    events_tx: Sender<ChangeEvent>,
    events_rx: Receiver<ChangeEvent>,
    pending: BTreeSet<PathBuf>,
    active: bool,
}

impl AutoSyncScheduler {
    pub fn new(mode: AutoSyncMode, notifier: Box<dyn ChangeNotifier>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            mode,
            notifier,
            timers: TimerQueue::new(),
            poll_timer: None,
            flush_timer: None,
            subscriptions: Vec::new(),
            events_tx,
            events_rx,
            pending: BTreeSet::new(),
            active: false,
        }
    }

    pub fn mode(&self) -> AutoSyncMode {
        self.mode
    }

    /// Switch strategy. An active scheduler is disabled; enable it again to
    /// start the new mode.
    pub fn set_mode(&mut self, mode: AutoSyncMode) {
        if self.mode != mode {
            self.disable();
            self.mode = mode;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> AutoSyncState {
        match (self.active, self.pending.is_empty()) {
            (false, _) => AutoSyncState::Disabled,
            (true, true) => AutoSyncState::Idle,
            (true, false) => AutoSyncState::PendingFlush,
        }
    }

    /// Earliest instant at which [`pump`](Self::pump) has timer work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Start automatic sync.
    ///
    /// Does nothing when already active or when no entry in `store` is
    /// enabled with auto-sync on. In watch mode every existing directory in
    /// `roots` is subscribed; missing ones are skipped.
    ///
    /// Returns whether the scheduler is active afterwards.
    ///
    /// # Errors
    ///
    /// Fails in watch mode when no root could be subscribed although at
    /// least one exists. The scheduler stays disabled in that case.
    pub fn enable(&mut self, now: Instant, store: &SyncEntryStore, roots: &[PathBuf]) -> Result<bool> {
        if self.active {
            return Ok(true);
        }
        if !store.any_auto_sync_active() {
            tracing::debug!("No entries with auto-sync, scheduler stays disabled");
            return Ok(false);
        }

        match self.mode {
            AutoSyncMode::Poll { interval } => {
                self.poll_timer = Some(self.timers.schedule_repeating(now, interval));
                tracing::info!(interval_secs = interval.as_secs_f64(), "Polling auto-sync enabled");
            }
            AutoSyncMode::Watch { debounce } => {
                let mut last_error = None;
                for root in roots.iter().filter(|r| r.is_dir()) {
                    match self.notifier.subscribe(root, self.events_tx.clone()) {
                        Ok(handle) => self.subscriptions.push(handle),
                        Err(e) => {
                            tracing::warn!(root = %root.display(), error = %e, "Could not watch directory");
                            last_error = Some(e);
                        }
                    }
                }
                if self.subscriptions.is_empty()
                    && let Some(e) = last_error
                {
                    return Err(e);
                }
                tracing::info!(
                    roots = self.subscriptions.len(),
                    debounce_ms = debounce.as_millis() as u64,
                    "Watching auto-sync enabled"
                );
            }
        }

        self.active = true;
        Ok(true)
    }

    /// Stop automatic sync. Safe to call repeatedly.
    ///
    /// Cancels all timers, releases every subscription and drops pending
    /// changes, so no pass fires afterwards.
    pub fn disable(&mut self) {
        for handle in self.subscriptions.drain(..) {
            self.notifier.unsubscribe(handle);
        }
        self.timers.clear();
        self.poll_timer = None;
        self.flush_timer = None;
        self.pending.clear();
        while self.events_rx.try_recv().is_ok() {}

        if self.active {
            self.active = false;
            tracing::info!("Auto-sync disabled");
        }
    }

    /// Process queued change events and due timers.
    ///
    /// Returns the reports of the passes that ran. Poll ticks that found no
    /// changed file produce no report.
    pub fn pump(&mut self, now: Instant, store: &SyncEntryStore, engine: &SyncEngine) -> Vec<SyncReport> {
        let events: Vec<ChangeEvent> = self.events_rx.try_iter().collect();
        if !self.active {
            return Vec::new();
        }

        for event in events {
            self.handle_event(event, store);
        }
        if !self.pending.is_empty()
            && self.flush_timer.is_none()
            && let AutoSyncMode::Watch { debounce } = self.mode
        {
            self.flush_timer = Some(self.timers.schedule_once(now, debounce));
        }

        let mut reports = Vec::new();
        for handle in self.timers.expire(now) {
            if Some(handle) == self.poll_timer {
                if let Some(report) = self.poll_pass(store, engine) {
                    reports.push(report);
                }
            } else if Some(handle) == self.flush_timer {
                self.flush_timer = None;
                reports.push(self.flush(store, engine));
            }
        }
        reports
    }

    fn handle_event(&mut self, event: ChangeEvent, store: &SyncEntryStore) {
        if event.kind != ChangeKind::Modified
            || !NormalizedPath::new(&event.path).has_extension(CONFIG_EXTENSION)
        {
            return;
        }

        let tracked = event
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| store.get(name))
            .is_some_and(|entry| entry.is_auto_sync_active());

        if tracked && self.pending.insert(event.path.clone()) {
            tracing::debug!(path = %event.path.display(), "Config change queued for sync");
        }
    }

    fn poll_pass(&self, store: &SyncEntryStore, engine: &SyncEngine) -> Option<SyncReport> {
        let mut report = SyncReport::new(SyncDirection::ToGlobal);
        for entry in store.entries().iter().filter(|e| e.is_auto_sync_active()) {
            if !engine.project_path(entry).is_file() {
                tracing::debug!(file_name = %entry.file_name, "Project file missing, not polled");
                continue;
            }
            if engine.sizes_differ(entry) {
                tracing::debug!(file_name = %entry.file_name, "Size changed, syncing to global");
                report
                    .outcomes
                    .push(engine.sync_entry(entry, SyncDirection::ToGlobal));
            }
        }

        if report.outcomes.is_empty() {
            None
        } else {
            tracing::info!(copied = report.copied(), "Poll auto-sync pass finished");
            Some(report)
        }
    }

    fn flush(&mut self, store: &SyncEntryStore, engine: &SyncEngine) -> SyncReport {
        tracing::info!(changed = self.pending.len(), "Debounce elapsed, syncing to global");
        self.pending.clear();
        engine.save_to_global(store.entries())
    }
}

impl Drop for AutoSyncScheduler {
    fn drop(&mut self) {
        self.disable();
    }
}

impl std::fmt::Debug for AutoSyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSyncScheduler")
            .field("mode", &self.mode)
            .field("state", &self.state())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
