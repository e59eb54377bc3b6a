//! Project context detection
//!
//! Finds the project containing the working directory, resolves layered
//! configuration and opens an initialized sync service. Like git, commands
//! work from any directory inside the project.

use std::path::{Path, PathBuf};
use std::time::Instant;

use omnisync_core::{
    ChangeNotifier, ConfigResolver, Error, FsChangeNotifier, HostNotifier, InitSummary,
    ProjectContext, ResolvedConfig, SyncService,
};

use crate::error::{CliError, Result};

/// How change notifications reach the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notifications {
    /// Real filesystem watcher, for long-running commands
    Live,
    /// Nothing is watched, for one-shot commands
    Off,
}

/// An opened project
pub struct Session {
    pub config: ResolvedConfig,
    pub service: SyncService,
    pub summary: InitSummary,
}

impl Session {
    /// Detect the project at or above `start` and initialize its service.
    pub fn open(start: &Path, notifications: Notifications) -> Result<Self> {
        let project = ProjectContext::detect(start).map_err(|e| match e {
            Error::ProjectNotFound { path } => CliError::user(format!(
                "No Unreal project (*.uproject) found at or above {}",
                path.display()
            )),
            other => other.into(),
        })?;
        tracing::debug!(project = %project.name, root = %project.root.display(), "Detected project");

        let config = ConfigResolver::new(&project.root).resolve()?;
        let notifier: Box<dyn ChangeNotifier> = match notifications {
            Notifications::Live => Box::new(FsChangeNotifier::new()),
            Notifications::Off => Box::new(HostNotifier::new()),
        };

        let mut service = SyncService::from_config(&config, project, notifier)?;
        let summary = service.init(Instant::now());

        Ok(Self {
            config,
            service,
            summary,
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.service.shutdown();
    }
}

/// The directory commands start from.
pub fn start_dir(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}
