//! Project context detection
//!
//! Finds the project root from any directory inside it, the same way `git`
//! finds its repository: walk up until a `*.uproject` file is found.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::paths::EngineVersion;
use crate::{Error, Result};

/// Extension of the project descriptor that marks a project root
pub const PROJECT_FILE_EXTENSION: &str = "uproject";

/// The subset of the project descriptor we read
#[derive(Debug, Default, Deserialize)]
struct ProjectDescriptor {
    #[serde(rename = "EngineAssociation", default)]
    engine_association: String,
}

/// Where the project lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Project root directory (contains `Config/`, `Saved/`, `Plugins/`)
    pub root: PathBuf,
    /// Project name, used for the `PerProject` scope
    pub name: String,
    /// Engine version from the descriptor, when it names a released engine
    pub engine_version: Option<EngineVersion>,
}

impl ProjectContext {
    /// Build a context without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            engine_version: None,
        }
    }

    pub fn with_engine_version(mut self, version: EngineVersion) -> Self {
        self.engine_version = Some(version);
        self
    }

    /// Walk up from `start` to the first directory holding a project file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] when no ancestor contains one.
    pub fn detect(start: &Path) -> Result<Self> {
        let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());

        for dir in start.ancestors() {
            if let Some(project_file) = find_project_file(dir) {
                return Ok(Self::from_project_file(dir, &project_file));
            }
        }

        Err(Error::ProjectNotFound { path: start })
    }

    fn from_project_file(root: &Path, project_file: &Path) -> Self {
        let name = project_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let engine_version = match read_descriptor(project_file) {
            Ok(descriptor) => descriptor.engine_association.parse().ok(),
            Err(e) => {
                tracing::warn!(path = %project_file.display(), error = %e, "Unreadable project descriptor");
                None
            }
        };

        tracing::debug!(root = %root.display(), %name, ?engine_version, "Detected project");
        Self {
            root: root.to_path_buf(),
            name,
            engine_version,
        }
    }

    /// Primary config directory, scanned non-recursively.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("Config")
    }

    /// Per-user saved config directory, scanned recursively.
    pub fn saved_config_dir(&self) -> PathBuf {
        self.root.join("Saved").join("Config")
    }

    /// Project plugins directory, scanned recursively.
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("Plugins")
    }
}

fn find_project_file(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn read_descriptor(path: &Path) -> Result<ProjectDescriptor> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
