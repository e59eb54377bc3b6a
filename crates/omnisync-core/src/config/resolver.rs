//! Configuration resolution with layered merge
//!
//! The `ConfigResolver` loads and merges configuration from multiple sources
//! in a defined hierarchy, with later sources overriding earlier ones.

use std::path::{Path, PathBuf};
use std::time::Duration;

use omnisync_fs::{ConfigStore, NormalizedPath};

use crate::paths::{EngineVersion, PathResolver};
use crate::project::ProjectContext;
use crate::scheduler::AutoSyncMode;
use crate::{Error, Result};

use super::manifest::{AutoSyncKind, Manifest};

/// Environment variable that overrides the settings root from every layer
pub const SETTINGS_ROOT_ENV: &str = "OMNISYNC_SETTINGS_ROOT";

/// Project-level configuration directory
pub const PROJECT_CONFIG_DIR: &str = ".omnisync";

const DEFAULT_VENDOR: &str = "UnrealEngine";
const DEFAULT_PLUGIN_NAME: &str = "OmniSync";

/// The effective configuration after merging all layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Settings root; `None` means the platform default
    pub settings_root: Option<PathBuf>,
    pub vendor: String,
    pub plugin_name: String,
    /// Overrides the detected project name
    pub project_name: Option<String>,
    /// Overrides the detected engine version
    pub engine_version: Option<EngineVersion>,
    pub auto_sync: AutoSyncKind,
    pub poll_interval: Duration,
    pub debounce: Duration,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            settings_root: None,
            vendor: DEFAULT_VENDOR.to_string(),
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            project_name: None,
            engine_version: None,
            auto_sync: AutoSyncKind::default(),
            poll_interval: AutoSyncMode::DEFAULT_POLL_INTERVAL,
            debounce: AutoSyncMode::DEFAULT_DEBOUNCE,
        }
    }
}

impl ResolvedConfig {
    /// Build the effective configuration from a merged manifest.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable engine version or an interval
    /// that is zero or above its maximum.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let defaults = Self::default();

        let engine_version = manifest
            .project
            .engine_version
            .as_deref()
            .map(str::parse::<EngineVersion>)
            .transpose()?;

        let poll_interval = match manifest.auto_sync.poll_interval_secs {
            Some(secs) => bounded(
                "auto_sync.poll_interval_secs",
                Duration::from_secs(secs),
                AutoSyncMode::MAX_POLL_INTERVAL,
            )?,
            None => defaults.poll_interval,
        };

        let debounce = match manifest.auto_sync.debounce_ms {
            Some(ms) => bounded(
                "auto_sync.debounce_ms",
                Duration::from_millis(ms),
                AutoSyncMode::MAX_DEBOUNCE,
            )?,
            None => defaults.debounce,
        };

        Ok(Self {
            settings_root: manifest.paths.settings_root.clone(),
            vendor: manifest.paths.vendor.clone().unwrap_or(defaults.vendor),
            plugin_name: manifest
                .paths
                .plugin_name
                .clone()
                .unwrap_or(defaults.plugin_name),
            project_name: manifest.project.name.clone(),
            engine_version,
            auto_sync: manifest.auto_sync.mode.unwrap_or_default(),
            poll_interval,
            debounce,
        })
    }

    /// The settings root, falling back to the platform local data directory.
    pub fn settings_root(&self) -> Result<PathBuf> {
        match &self.settings_root {
            Some(root) => Ok(root.clone()),
            None => dirs::data_local_dir().ok_or(Error::NoSettingsRoot),
        }
    }

    /// Scheduler mode for the configured auto-sync kind.
    pub fn auto_sync_mode(&self) -> AutoSyncMode {
        match self.auto_sync {
            AutoSyncKind::Poll => AutoSyncMode::Poll {
                interval: self.poll_interval,
            },
            AutoSyncKind::Watch => AutoSyncMode::Watch {
                debounce: self.debounce,
            },
        }
    }

    /// Apply the project overrides to a detected context.
    pub fn apply_to(&self, mut project: ProjectContext) -> ProjectContext {
        if let Some(name) = &self.project_name {
            project.name = name.clone();
        }
        if let Some(version) = self.engine_version {
            project.engine_version = Some(version);
        }
        project
    }

    /// Build the path resolver for `project`.
    ///
    /// # Errors
    ///
    /// Fails when no engine version is known from either the project file or
    /// the configuration, or when no settings root can be determined.
    pub fn path_resolver(&self, project: &ProjectContext) -> Result<PathResolver> {
        let engine_version = self
            .engine_version
            .or(project.engine_version)
            .ok_or_else(|| Error::InvalidConfig {
                message: format!(
                    "engine version of project '{}' is unknown; set [project] engine_version",
                    project.name
                ),
            })?;
        let project_name = self.project_name.as_deref().unwrap_or(&project.name);

        Ok(PathResolver::new(
            self.settings_root()?,
            &self.vendor,
            &self.plugin_name,
            project_name,
            engine_version,
        ))
    }
}

/// Accept `value` when it is non-zero and at most `max`.
fn bounded(key: &str, value: Duration, max: Duration) -> Result<Duration> {
    if value.is_zero() || value > max {
        return Err(Error::InvalidConfig {
            message: format!("{key} must be non-zero and at most {max:?}"),
        });
    }
    Ok(value)
}

/// Resolves configuration by merging multiple sources
///
/// Configuration is loaded from a hierarchy of sources:
/// 1. User defaults (`<config_dir>/omnisync/config.toml`)
/// 2. Project config (`.omnisync/config.toml`)
/// 3. Local overrides (`.omnisync/config.local.toml`), kept out of version control
/// 4. The `OMNISYNC_SETTINGS_ROOT` environment variable
pub struct ConfigResolver {
    /// Project root directory
    root: PathBuf,

    /// Override for the user config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    user_config_dir_override: Option<PathBuf>,

    /// Whether layer 4 is consulted
    read_env: bool,
}

impl ConfigResolver {
    /// Create a resolver for the project at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            user_config_dir_override: None,
            read_env: true,
        }
    }

    /// Create a resolver with a custom user config directory and no
    /// environment layer, so tests are isolated from the real user setup.
    pub fn with_user_config_dir(root: impl Into<PathBuf>, user_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            user_config_dir_override: Some(user_config_dir),
            read_env: false,
        }
    }

    fn user_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.user_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("omnisync"))
    }

    /// Path of the project layer.
    pub fn project_config_path(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_DIR).join("config.toml")
    }

    /// Path of the local override layer.
    pub fn local_config_path(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_DIR).join("config.local.toml")
    }

    /// Resolve the configuration by merging all layers.
    ///
    /// Missing layers are silently skipped. Invalid TOML in any layer
    /// produces an error.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut manifest = Manifest::default();

        if let Some(user_dir) = self.user_config_dir() {
            merge_layer(&mut manifest, &user_dir.join("config.toml"), "user")?;
        }
        merge_layer(&mut manifest, &self.project_config_path(), "project")?;
        merge_layer(&mut manifest, &self.local_config_path(), "local")?;

        if self.read_env
            && let Some(root) = std::env::var_os(SETTINGS_ROOT_ENV).filter(|v| !v.is_empty())
        {
            tracing::debug!(settings_root = ?root, "Settings root taken from environment");
            manifest.paths.settings_root = Some(PathBuf::from(root));
        }

        ResolvedConfig::from_manifest(&manifest)
    }
}

fn merge_layer(manifest: &mut Manifest, path: &Path, layer: &str) -> Result<()> {
    if !path.is_file() {
        tracing::debug!(?path, layer, "No config layer found, skipping");
        return Ok(());
    }
    tracing::debug!(?path, layer, "Loading config layer");
    let loaded: Manifest = ConfigStore::new().load(&NormalizedPath::new(path))?;
    manifest.merge(&loaded);
    Ok(())
}
