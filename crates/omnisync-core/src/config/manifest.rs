//! Manifest parsing for config.toml files
//!
//! A manifest is one parsed configuration layer. Every value is optional so
//! that layers can be merged: a value present in a later layer replaces the
//! one from an earlier layer, an absent value leaves it alone.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Result;

/// How automatic sync detects local changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoSyncKind {
    /// Compare file sizes on a fixed interval
    #[default]
    Poll,
    /// React to filesystem change notifications, debounced
    Watch,
}

/// `[paths]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsSection {
    /// Per-user settings directory the global tree is rooted in
    pub settings_root: Option<PathBuf>,
    /// Product directory under the settings root
    pub vendor: Option<String>,
    /// Plugin directory and settings file prefix
    pub plugin_name: Option<String>,
}

/// `[project]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Overrides the name taken from the project file
    pub name: Option<String>,
    /// Overrides the engine association from the project file
    pub engine_version: Option<String>,
}

/// `[auto_sync]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSyncSection {
    pub mode: Option<AutoSyncKind>,
    pub poll_interval_secs: Option<u64>,
    pub debounce_ms: Option<u64>,
}

/// OmniSync configuration manifest parsed from config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub auto_sync: AutoSyncSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use omnisync_core::config::{AutoSyncKind, Manifest};
    ///
    /// let manifest = Manifest::parse(r#"
    /// [project]
    /// engine_version = "5.4"
    ///
    /// [auto_sync]
    /// mode = "watch"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.auto_sync.mode, Some(AutoSyncKind::Watch));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Merge another manifest into this one; `other` takes precedence.
    pub fn merge(&mut self, other: &Manifest) {
        overlay(&mut self.paths.settings_root, &other.paths.settings_root);
        overlay(&mut self.paths.vendor, &other.paths.vendor);
        overlay(&mut self.paths.plugin_name, &other.paths.plugin_name);

        overlay(&mut self.project.name, &other.project.name);
        overlay(&mut self.project.engine_version, &other.project.engine_version);

        overlay(&mut self.auto_sync.mode, &other.auto_sync.mode);
        overlay(
            &mut self.auto_sync.poll_interval_secs,
            &other.auto_sync.poll_interval_secs,
        );
        overlay(&mut self.auto_sync.debounce_ms, &other.auto_sync.debounce_ms);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if let Some(value) = other {
        *base = Some(value.clone());
    }
}
