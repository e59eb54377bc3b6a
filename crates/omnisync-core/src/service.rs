//! The per-project sync service
//!
//! [`SyncService`] owns the entry store, the copy engine and the auto-sync
//! scheduler for one project. The host creates it once, calls
//! [`SyncService::init`], drives it with [`SyncService::pump`] and calls
//! [`SyncService::shutdown`] on exit. All of it runs on the host's thread.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use omnisync_fs::{NormalizedPath, RobustnessConfig};

use crate::config::ResolvedConfig;
use crate::discovery::ConfigDiscoverer;
use crate::engine::{SyncEngine, SyncReport};
use crate::paths::PathResolver;
use crate::project::ProjectContext;
use crate::scheduler::{AutoSyncMode, AutoSyncScheduler, AutoSyncState};
use crate::store::{SyncEntry, SyncEntryStore};
use crate::watch::ChangeNotifier;
use crate::{Error, Result};

/// What [`SyncService::init`] found and did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitSummary {
    /// A settings document was read
    pub loaded: bool,
    /// Entries whose relative path was filled in
    pub resolved: usize,
    /// Entries added by discovery
    pub discovered: usize,
    /// Auto-sync is scheduled
    pub auto_sync_active: bool,
}

pub struct SyncService {
    project: ProjectContext,
    discoverer: ConfigDiscoverer,
    store: SyncEntryStore,
    engine: SyncEngine,
    scheduler: AutoSyncScheduler,
    last_sync: Option<DateTime<Utc>>,
}

impl SyncService {
    pub fn new(
        project: ProjectContext,
        resolver: PathResolver,
        mode: AutoSyncMode,
        notifier: Box<dyn ChangeNotifier>,
    ) -> Self {
        let store = SyncEntryStore::new(resolver.settings_file_path());
        let discoverer = ConfigDiscoverer::new(&project);
        if NormalizedPath::new(resolver.base_directory()).is_network_path() {
            tracing::info!(
                base = %resolver.base_directory().display(),
                "Global settings live on a network path, copies may be slow"
            );
        }
        let engine = SyncEngine::new(project.root.clone(), resolver);

        Self {
            project,
            discoverer,
            store,
            engine,
            scheduler: AutoSyncScheduler::new(mode, notifier),
            last_sync: None,
        }
    }

    /// Build a service from resolved configuration.
    ///
    /// # Errors
    ///
    /// Fails when the engine version or the settings root is unknown.
    pub fn from_config(
        config: &ResolvedConfig,
        project: ProjectContext,
        notifier: Box<dyn ChangeNotifier>,
    ) -> Result<Self> {
        let project = config.apply_to(project);
        let resolver = config.path_resolver(&project)?;
        Ok(Self::new(project, resolver, config.auto_sync_mode(), notifier))
    }

    /// Override retry and locking for file copies and settings writes.
    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.engine = self.engine.clone().with_robustness(robustness);
        self.store.set_robustness(robustness);
        self
    }

    /// Load settings, fill in missing paths, discover new files and start
    /// auto-sync.
    ///
    /// Nothing here is fatal: a missing or unreadable settings document
    /// leaves the store empty and every other failure is logged.
    pub fn init(&mut self, now: Instant) -> InitSummary {
        let mut summary = InitSummary::default();

        match self.store.load() {
            Ok(()) => summary.loaded = true,
            Err(Error::SettingsNotFound { path }) => {
                tracing::info!(path = %path.display(), "No saved settings yet, starting empty");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable settings file");
            }
        }

        summary.resolved = self.store.resolve_missing_paths(&self.discoverer);
        if summary.resolved > 0
            && let Err(e) = self.store.save()
        {
            tracing::warn!(error = %e, "Could not persist resolved paths");
        }

        summary.discovered = self.discover_and_add_config_files().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not persist discovered files");
            0
        });

        summary.auto_sync_active = self.enable_auto_sync(now).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Auto-sync could not be started");
            false
        });

        tracing::info!(
            project = %self.project.name,
            entries = self.store.len(),
            auto_sync = summary.auto_sync_active,
            "Sync service initialized"
        );
        summary
    }

    /// Stop auto-sync. No pass runs after this returns.
    pub fn shutdown(&mut self) {
        self.scheduler.disable();
        tracing::debug!(project = %self.project.name, "Sync service shut down");
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn resolver(&self) -> &PathResolver {
        self.engine.resolver()
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn discoverer(&self) -> &ConfigDiscoverer {
        &self.discoverer
    }

    pub fn store(&self) -> &SyncEntryStore {
        &self.store
    }

    /// Mutable store access. Call [`on_settings_changed`](Self::on_settings_changed)
    /// after editing to persist and apply the changes.
    pub fn store_mut(&mut self) -> &mut SyncEntryStore {
        &mut self.store
    }

    pub fn entries(&self) -> &[SyncEntry] {
        self.store.entries()
    }

    pub fn entry_mut(&mut self, file_name: &str) -> Option<&mut SyncEntry> {
        self.store.get_mut(file_name)
    }

    /// Directories discovery scans and watch mode subscribes to.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        self.discoverer
            .roots()
            .iter()
            .map(|root| root.path.clone())
            .collect()
    }

    /// Add newly discovered config files to the store.
    pub fn discover_and_add_config_files(&mut self) -> Result<usize> {
        self.discoverer.discover_and_add(&mut self.store)
    }

    /// Copy every enabled entry to its global location.
    pub fn save_settings_to_global(&mut self) -> SyncReport {
        let report = self.engine.save_to_global(self.store.entries());
        self.record(&report);
        report
    }

    /// Copy every enabled entry from its global location into the project.
    pub fn load_settings_from_global(&mut self) -> SyncReport {
        let report = self.engine.load_from_global(self.store.entries());
        self.record(&report);
        report
    }

    /// Persist the store and apply the new settings.
    ///
    /// With any auto-sync entry left, the scheduler restarts and a save pass
    /// runs immediately; its report is returned. Otherwise auto-sync stops.
    ///
    /// # Errors
    ///
    /// Returns the save error after the scheduler has been updated.
    pub fn on_settings_changed(&mut self, now: Instant) -> Result<Option<SyncReport>> {
        let saved = self.store.save();

        self.scheduler.disable();
        let report = if self.store.any_auto_sync_active() {
            if let Err(e) = self.enable_auto_sync(now) {
                tracing::warn!(error = %e, "Auto-sync could not be restarted");
            }
            Some(self.save_settings_to_global())
        } else {
            None
        };

        saved?;
        Ok(report)
    }

    /// Start auto-sync if any entry wants it. Returns whether it is active.
    pub fn enable_auto_sync(&mut self, now: Instant) -> Result<bool> {
        let roots = self.watch_roots();
        self.scheduler.enable(now, &self.store, &roots)
    }

    pub fn disable_auto_sync(&mut self) {
        self.scheduler.disable();
    }

    /// Switch auto-sync strategy, restarting it when it was running.
    pub fn set_auto_sync_mode(&mut self, mode: AutoSyncMode, now: Instant) -> Result<bool> {
        let was_active = self.scheduler.is_active();
        self.scheduler.set_mode(mode);
        if was_active {
            self.enable_auto_sync(now)
        } else {
            Ok(false)
        }
    }

    pub fn auto_sync_mode(&self) -> AutoSyncMode {
        self.scheduler.mode()
    }

    pub fn auto_sync_state(&self) -> AutoSyncState {
        self.scheduler.state()
    }

    /// When the next timer is due, for hosts that sleep between pumps.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Run due auto-sync work. Call regularly from the host loop.
    pub fn pump(&mut self, now: Instant) -> Vec<SyncReport> {
        let reports = self.scheduler.pump(now, &self.store, &self.engine);
        for report in &reports {
            self.record(report);
        }
        reports
    }

    /// Completion time of the last pass that copied anything.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    fn record(&mut self, report: &SyncReport) {
        if report.succeeded() {
            self.last_sync = Some(report.finished_at);
        }
    }
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("project", &self.project.name)
            .field("entries", &self.store.len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
