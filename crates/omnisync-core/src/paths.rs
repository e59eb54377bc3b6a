//! Scope-qualified global directories and entry paths
//!
//! Every global location is derived from
//! `(settings_root, vendor, plugin_name, scope, project_name, engine_version)`
//! and nothing else, so two processes configured the same way always agree
//! on where a file lives.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::scope::SyncScope;
use crate::{Error, Result};

/// Engine version reduced to the `<major>.<minor>` pair used for scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for EngineVersion {
    type Err = Error;

    /// Parses `5.4`, `5.4.1` and `5.4-custom`; patch and suffix are dropped.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidEngineVersion {
            value: s.to_string(),
        };

        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .map(leading_digits)
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;

        Ok(Self { major, minor })
    }
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

/// Join a forward-slash relative path onto `base` component by component.
///
/// Empty and `.` components are dropped; `..` is refused so a hand-edited
/// settings document cannot point outside the base directory.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Computes global directories for each scope and the settings file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    /// `<settings_root>/<vendor>/<plugin_name>`
    base: PathBuf,
    plugin_name: String,
    project_name: String,
    engine_version: EngineVersion,
}

impl PathResolver {
    /// Create a resolver.
    ///
    /// # Arguments
    ///
    /// * `settings_root` - Per-user settings directory (e.g. `%LOCALAPPDATA%`)
    /// * `vendor` - Product directory under the settings root (`UnrealEngine`)
    /// * `plugin_name` - Plugin directory and settings file prefix (`OmniSync`)
    /// * `project_name` - Name used for the `PerProject` tier
    /// * `engine_version` - Version used for the `PerEngineVersion` tier
    pub fn new(
        settings_root: impl Into<PathBuf>,
        vendor: &str,
        plugin_name: &str,
        project_name: &str,
        engine_version: EngineVersion,
    ) -> Self {
        let base = settings_root.into().join(vendor).join(plugin_name);
        Self {
            base,
            plugin_name: plugin_name.to_string(),
            project_name: project_name.to_string(),
            engine_version,
        }
    }

    /// The plugin directory every scope lives under.
    pub fn base_directory(&self) -> &Path {
        &self.base
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn engine_version(&self) -> EngineVersion {
        self.engine_version
    }

    /// Global directory an entry with `scope` syncs through.
    pub fn scoped_directory(&self, scope: SyncScope) -> PathBuf {
        let tier = self.base.join(scope.as_str());
        match scope {
            SyncScope::Global => tier,
            SyncScope::PerEngineVersion => tier.join(self.engine_version.to_string()),
            SyncScope::PerProject => tier.join(&self.project_name),
        }
    }

    /// The settings document always lives in the per-project tier, whatever
    /// scopes the individual entries use.
    pub fn settings_file_path(&self) -> PathBuf {
        self.scoped_directory(SyncScope::PerProject)
            .join(format!("{}Settings.json", self.plugin_name))
    }

    /// Global counterpart of a project-relative file.
    pub fn global_path(&self, scope: SyncScope, relative_path: &str) -> PathBuf {
        join_relative(&self.scoped_directory(scope), relative_path)
    }

    /// Create `path` (and its ancestors) if it does not exist yet.
    pub fn ensure_directory_exists(path: &Path) -> Result<()> {
        omnisync_fs::io::ensure_dir(path).map_err(Error::from)
    }
}
