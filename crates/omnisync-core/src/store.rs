//! Tracked entries and their persisted settings document
//!
//! The store is an ordered list of [`SyncEntry`] values keyed by bare file
//! name. It is persisted as a single JSON document:
//!
//! ```json
//! {
//!   "Settings": [
//!     {
//!       "FileName": "DefaultEngine.ini",
//!       "RelativePath": "Config/DefaultEngine.ini",
//!       "bEnabled": true,
//!       "SettingsScope": 1,
//!       "bAutoSyncEnabled": true
//!     }
//!   ]
//! }
//! ```
//!
//! Mutations never persist on their own; callers batch their changes and
//! call [`SyncEntryStore::save`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use omnisync_fs::{ConfigStore, NormalizedPath, RobustnessConfig};
use serde::{Deserialize, Serialize};

use crate::discovery::ConfigDiscoverer;
use crate::scope::SyncScope;
use crate::{Error, Result};

/// Lowercase name fragments of files the editor keeps under `Saved/Config`
const SAVED_CONFIG_MARKERS: [&str; 3] = ["layout", "usersettings", "asseteditor"];

/// A tracked config file and its sync settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncEntry {
    /// Bare file name, unique within the store
    #[serde(rename = "FileName", alias = "fileName")]
    pub file_name: String,

    /// Project-relative path with forward slashes; empty until resolved
    #[serde(rename = "RelativePath", alias = "relativePath")]
    pub relative_path: String,

    /// Participates in save/load passes
    #[serde(rename = "bEnabled")]
    pub enabled: bool,

    /// Global tier the file syncs through
    #[serde(rename = "SettingsScope", alias = "settingsScope")]
    pub scope: SyncScope,

    /// Participates in automatic sync
    #[serde(rename = "bAutoSyncEnabled")]
    pub auto_sync_enabled: bool,
}

impl Default for SyncEntry {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            relative_path: String::new(),
            enabled: false,
            scope: SyncScope::default(),
            auto_sync_enabled: true,
        }
    }
}

impl SyncEntry {
    /// A freshly discovered entry: disabled, default scope, auto-sync on.
    pub fn new(file_name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            relative_path: NormalizedPath::new(relative_path.into()).as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_scope(mut self, scope: SyncScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_auto_sync(mut self, auto_sync_enabled: bool) -> Self {
        self.auto_sync_enabled = auto_sync_enabled;
        self
    }

    /// Enabled and opted into automatic sync.
    pub fn is_auto_sync_active(&self) -> bool {
        self.enabled && self.auto_sync_enabled
    }

    /// The relative path used for copies.
    ///
    /// Entries that were never resolved fall back to `Saved/Config/<FileName>`
    /// for editor layout and per-user files, and to `Config/<FileName>`
    /// otherwise.
    pub fn effective_relative_path(&self) -> String {
        if !self.relative_path.is_empty() {
            return self.relative_path.clone();
        }
        let name = self.file_name.to_ascii_lowercase();
        if SAVED_CONFIG_MARKERS.iter().any(|marker| name.contains(marker)) {
            format!("Saved/Config/{}", self.file_name)
        } else {
            format!("Config/{}", self.file_name)
        }
    }
}

/// On-disk shape of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(rename = "Settings", alias = "settings", default)]
    pub settings: Vec<SyncEntry>,
}

/// The persisted collection of tracked entries
#[derive(Debug)]
pub struct SyncEntryStore {
    path: PathBuf,
    entries: Vec<SyncEntry>,
    config_store: ConfigStore,
}

impl SyncEntryStore {
    /// An empty store persisted at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            config_store: ConfigStore::new(),
        }
    }

    /// Use `robustness` for locking and retries when saving.
    pub fn set_robustness(&mut self, robustness: RobustnessConfig) {
        self.config_store = ConfigStore::with_robustness(robustness);
    }

    /// Location of the settings document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory entries with the persisted document.
    ///
    /// Entries repeating an earlier file name are dropped with a warning.
    ///
    /// # Errors
    ///
    /// [`Error::SettingsNotFound`] when there is no document yet, or the
    /// parse/read error. The in-memory entries are untouched on error.
    pub fn load(&mut self) -> Result<()> {
        let path = NormalizedPath::new(&self.path);
        let document: SettingsDocument = match self.config_store.load(&path) {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                return Err(Error::SettingsNotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read settings file");
                return Err(e.into());
            }
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(document.settings.len());
        for mut entry in document.settings {
            if !seen.insert(entry.file_name.clone()) {
                tracing::warn!(file_name = %entry.file_name, "Dropping duplicate entry from settings file");
                continue;
            }
            entry.relative_path = NormalizedPath::new(&entry.relative_path).as_str().to_string();
            entries.push(entry);
        }

        self.entries = entries;
        tracing::info!(path = %self.path.display(), entries = self.entries.len(), "Plugin settings loaded");
        Ok(())
    }

    /// Write the entries to the settings document, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns the directory-creation or write error. In-memory state is
    /// kept as it is.
    pub fn save(&self) -> Result<()> {
        let document = SettingsDocument {
            settings: self.entries.clone(),
        };
        match self
            .config_store
            .save(&NormalizedPath::new(&self.path), &document)
        {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Plugin settings saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to write settings file");
                Err(e.into())
            }
        }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[SyncEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.get(file_name).is_some()
    }

    pub fn get(&self, file_name: &str) -> Option<&SyncEntry> {
        self.entries.iter().find(|e| e.file_name == file_name)
    }

    pub fn get_mut(&mut self, file_name: &str) -> Option<&mut SyncEntry> {
        self.entries.iter_mut().find(|e| e.file_name == file_name)
    }

    /// Append `entry` unless its file name is already tracked.
    ///
    /// Returns whether it was inserted.
    pub fn insert(&mut self, entry: SyncEntry) -> bool {
        if self.contains(&entry.file_name) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Stop tracking a file.
    pub fn remove(&mut self, file_name: &str) -> Option<SyncEntry> {
        let pos = self.entries.iter().position(|e| e.file_name == file_name)?;
        Some(self.entries.remove(pos))
    }

    /// Returns false when no entry has that name.
    pub fn set_enabled(&mut self, file_name: &str, enabled: bool) -> bool {
        self.update(file_name, |entry| entry.enabled = enabled)
    }

    /// Returns false when no entry has that name.
    pub fn set_scope(&mut self, file_name: &str, scope: SyncScope) -> bool {
        self.update(file_name, |entry| entry.scope = scope)
    }

    /// Returns false when no entry has that name.
    pub fn set_auto_sync(&mut self, file_name: &str, auto_sync_enabled: bool) -> bool {
        self.update(file_name, |entry| entry.auto_sync_enabled = auto_sync_enabled)
    }

    fn update(&mut self, file_name: &str, apply: impl FnOnce(&mut SyncEntry)) -> bool {
        match self.get_mut(file_name) {
            Some(entry) => {
                apply(entry);
                true
            }
            None => false,
        }
    }

    /// True when at least one entry is enabled with auto-sync on.
    pub fn any_auto_sync_active(&self) -> bool {
        self.entries.iter().any(SyncEntry::is_auto_sync_active)
    }

    /// Fill in empty relative paths by locating each file by name.
    ///
    /// Returns how many entries were resolved. Does not save.
    pub fn resolve_missing_paths(&mut self, discoverer: &ConfigDiscoverer) -> usize {
        let mut resolved = 0;
        for entry in self.entries.iter_mut().filter(|e| e.relative_path.is_empty()) {
            let found = discoverer
                .find_config_file(&entry.file_name)
                .and_then(|path| discoverer.relative_path_for(&path));

            if let Some(relative_path) = found {
                tracing::debug!(file_name = %entry.file_name, %relative_path, "Resolved relative path");
                entry.relative_path = relative_path;
                resolved += 1;
            }
        }
        resolved
    }
}
