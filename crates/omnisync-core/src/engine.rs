//! Copy passes between the project and the global tiers
//!
//! A pass visits entries in store order and copies each one independently:
//! one missing or unwritable file never stops the rest of the pass.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use omnisync_fs::{RobustnessConfig, io};
use serde::Serialize;

use crate::paths::{PathResolver, join_relative};
use crate::store::SyncEntry;

/// Which way a pass copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Project file overwrites the global copy
    ToGlobal,
    /// Global copy overwrites the project file
    FromGlobal,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToGlobal => write!(f, "save to global"),
            Self::FromGlobal => write!(f, "load from global"),
        }
    }
}

/// What happened to one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Copied { bytes: u64 },
    /// Nothing to copy from
    Skipped { reason: String },
    Failed { error: String },
}

/// Result of copying a single entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub file_name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl EntryOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self.status, EntryStatus::Copied { .. })
    }
}

/// Aggregate verdict of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// At least this many entries were copied
    Synced(usize),
    /// No entry was eligible
    NothingToSync,
    /// Entries were attempted but none copied
    Failed(usize),
}

/// Outcome of one save or load pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub direction: SyncDirection,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<EntryOutcome>,
}

impl SyncReport {
    pub fn new(direction: SyncDirection) -> Self {
        Self {
            direction,
            finished_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_copied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, EntryStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&EntryStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// True when at least one entry was copied.
    pub fn succeeded(&self) -> bool {
        self.copied() > 0
    }

    /// True when no attempted entry was skipped or failed.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(EntryOutcome::is_copied)
    }

    pub fn outcome(&self) -> PassOutcome {
        match (self.outcomes.len(), self.copied()) {
            (0, _) => PassOutcome::NothingToSync,
            (_, 0) => PassOutcome::Failed(self.outcomes.len()),
            (_, copied) => PassOutcome::Synced(copied),
        }
    }

    /// One-line user notification for this pass.
    pub fn notification(&self) -> String {
        let problems = self.skipped() + self.failed();
        let suffix = if problems > 0 {
            format!(" ({problems} not synced)")
        } else {
            String::new()
        };

        match (self.direction, self.outcome()) {
            (_, PassOutcome::NothingToSync) => "No enabled config files to sync".to_string(),
            (SyncDirection::ToGlobal, PassOutcome::Synced(n)) => {
                format!("Saved {n} config file(s) to the global location{suffix}")
            }
            (SyncDirection::FromGlobal, PassOutcome::Synced(n)) => format!(
                "Loaded {n} config file(s) from the global location{suffix}; restart the editor to apply them"
            ),
            (SyncDirection::ToGlobal, PassOutcome::Failed(n)) => {
                format!("Failed to save {n} config file(s) to the global location")
            }
            (SyncDirection::FromGlobal, PassOutcome::Failed(n)) => {
                format!("Failed to load {n} config file(s) from the global location")
            }
        }
    }
}

/// Copies entries between a project and its global tiers
#[derive(Debug, Clone)]
pub struct SyncEngine {
    project_root: PathBuf,
    resolver: PathResolver,
    robustness: RobustnessConfig,
}

impl SyncEngine {
    pub fn new(project_root: impl Into<PathBuf>, resolver: PathResolver) -> Self {
        Self {
            project_root: project_root.into(),
            resolver,
            robustness: RobustnessConfig::default(),
        }
    }

    /// Override the retry and locking behaviour of copies.
    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Where `entry` lives inside the project.
    pub fn project_path(&self, entry: &SyncEntry) -> PathBuf {
        join_relative(&self.project_root, &entry.effective_relative_path())
    }

    /// Where `entry` lives inside its scope's global directory.
    pub fn global_path(&self, entry: &SyncEntry) -> PathBuf {
        self.resolver
            .global_path(entry.scope, &entry.effective_relative_path())
    }

    /// Copy every enabled entry from the project to the global tiers.
    pub fn save_to_global(&self, entries: &[SyncEntry]) -> SyncReport {
        self.run_pass(entries, SyncDirection::ToGlobal)
    }

    /// Copy every enabled entry from the global tiers into the project.
    pub fn load_from_global(&self, entries: &[SyncEntry]) -> SyncReport {
        self.run_pass(entries, SyncDirection::FromGlobal)
    }

    fn run_pass(&self, entries: &[SyncEntry], direction: SyncDirection) -> SyncReport {
        let mut report = SyncReport::new(direction);
        for entry in entries.iter().filter(|e| e.enabled) {
            report.outcomes.push(self.sync_entry(entry, direction));
        }
        report.finished_at = Utc::now();

        tracing::info!(
            %direction,
            copied = report.copied(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Sync pass finished"
        );
        report
    }

    /// Copy a single entry regardless of its enabled flag.
    pub fn sync_entry(&self, entry: &SyncEntry, direction: SyncDirection) -> EntryOutcome {
        let (source, destination) = match direction {
            SyncDirection::ToGlobal => (self.project_path(entry), self.global_path(entry)),
            SyncDirection::FromGlobal => (self.global_path(entry), self.project_path(entry)),
        };

        let status = match self.copy_file(&source, &destination) {
            Ok(bytes) => {
                tracing::debug!(file_name = %entry.file_name, %direction, bytes, "Copied config file");
                EntryStatus::Copied { bytes }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(file_name = %entry.file_name, source = %source.display(), "Source file not found");
                EntryStatus::Skipped {
                    reason: format!("source not found: {}", source.display()),
                }
            }
            Err(e) => {
                tracing::error!(file_name = %entry.file_name, error = %e, "Failed to copy config file");
                EntryStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        EntryOutcome {
            file_name: entry.file_name.clone(),
            source,
            destination,
            status,
        }
    }

    /// Overwrite `destination` with `source`, creating parent directories.
    ///
    /// A source that is a directory is reported as a failure, not copied.
    pub fn copy_file(&self, source: &Path, destination: &Path) -> omnisync_fs::Result<u64> {
        if source.is_dir() {
            return Err(omnisync_fs::Error::io(
                source,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "source is a directory"),
            ));
        }
        io::copy_file(source, destination, self.robustness)
    }

    /// True when the project and global copies of `entry` differ in size.
    ///
    /// A missing file counts as a distinct size, so a file present on only
    /// one side differs.
    pub fn sizes_differ(&self, entry: &SyncEntry) -> bool {
        io::file_size(self.project_path(entry)) != io::file_size(self.global_path(entry))
    }
}
