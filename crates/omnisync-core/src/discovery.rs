//! Config file discovery
//!
//! Walks the project's source roots for `.ini` files and registers the ones
//! the store does not know about yet.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use omnisync_fs::NormalizedPath;
use walkdir::WalkDir;

use crate::Result;
use crate::project::ProjectContext;
use crate::store::{SyncEntry, SyncEntryStore};

/// Extension of the files that are discovered
pub const CONFIG_EXTENSION: &str = "ini";

/// Name fragments of editor backups and in-flight writes
const TRANSIENT_MARKERS: [&str; 3] = [".bak", ".tmp", "~"];

/// A directory scanned during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    pub path: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Drop backup and temp files
    pub skip_transient: bool,
    /// Only accept files that sit below a `Config` directory
    pub require_config_dir: bool,
}

impl SourceRoot {
    /// The project's primary `Config/` directory (top level only).
    pub fn primary(path: PathBuf) -> Self {
        Self {
            path,
            recursive: false,
            skip_transient: false,
            require_config_dir: false,
        }
    }

    /// `Saved/Config/`, searched recursively.
    pub fn saved(path: PathBuf) -> Self {
        Self {
            path,
            recursive: true,
            skip_transient: true,
            require_config_dir: false,
        }
    }

    /// `Plugins/`, searched recursively for each plugin's `Config/`.
    pub fn plugins(path: PathBuf) -> Self {
        Self {
            path,
            recursive: true,
            skip_transient: true,
            require_config_dir: true,
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        if self.skip_transient && TRANSIENT_MARKERS.iter().any(|m| name.contains(m)) {
            return false;
        }

        if self.require_config_dir {
            let inside_config = path
                .strip_prefix(&self.path)
                .ok()
                .and_then(Path::parent)
                .is_some_and(|parent| {
                    parent
                        .components()
                        .any(|c| c.as_os_str().eq_ignore_ascii_case("config"))
                });
            if !inside_config {
                return false;
            }
        }

        true
    }
}

/// Finds candidate config files under a project's source roots.
#[derive(Debug, Clone)]
pub struct ConfigDiscoverer {
    project_root: PathBuf,
    roots: Vec<SourceRoot>,
}

impl ConfigDiscoverer {
    /// Discoverer over the three standard roots of `project`.
    pub fn new(project: &ProjectContext) -> Self {
        Self {
            project_root: project.root.clone(),
            roots: vec![
                SourceRoot::primary(project.config_dir()),
                SourceRoot::saved(project.saved_config_dir()),
                SourceRoot::plugins(project.plugins_dir()),
            ],
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn roots(&self) -> &[SourceRoot] {
        &self.roots
    }

    /// Every config file under the source roots, in root order.
    ///
    /// A path found by more than one root is reported once. Missing or
    /// unreadable roots contribute nothing.
    pub fn discover_all_config_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for root in &self.roots {
            for path in scan_root(root).into_iter().filter(|p| root.accepts(p)) {
                if seen.insert(path.clone()) {
                    result.push(path);
                }
            }
        }

        tracing::debug!(count = result.len(), "Discovered config files");
        result
    }

    /// Forward-slash path of `path` relative to the project root.
    pub fn relative_path_for(&self, path: &Path) -> Option<String> {
        NormalizedPath::new(path)
            .relative_to(&NormalizedPath::new(&self.project_root))
            .filter(|relative| !relative.is_empty())
            .map(|relative| relative.as_str().to_string())
    }

    /// Locate a config file by bare name, searching the roots in order.
    pub fn find_config_file(&self, file_name: &str) -> Option<PathBuf> {
        self.discover_all_config_paths()
            .into_iter()
            .find(|path| path.file_name().is_some_and(|name| name == file_name))
    }

    /// Register every newly discovered file in `store`.
    ///
    /// Files whose bare name is already tracked are skipped, as is the second
    /// file of a name seen twice in this run. New entries start disabled with
    /// the default scope. The store is saved only when something was added.
    ///
    /// # Errors
    ///
    /// Returns the save error; the new entries stay in memory either way.
    pub fn discover_and_add(&self, store: &mut SyncEntryStore) -> Result<usize> {
        let mut known: HashSet<String> = store
            .entries()
            .iter()
            .map(|entry| entry.file_name.clone())
            .collect();

        let mut added = 0;
        for path in self.discover_all_config_paths() {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if known.contains(&file_name) {
                continue;
            }

            let Some(relative_path) = self.relative_path_for(&path) else {
                tracing::warn!(path = %path.display(), "Config file outside the project root, not tracked");
                continue;
            };

            tracing::debug!(%file_name, %relative_path, "Tracking new config file");
            known.insert(file_name.clone());
            store.insert(SyncEntry::new(file_name, relative_path));
            added += 1;
        }

        if added > 0 {
            tracing::info!(added, "Added new config files to the sync list");
            store.save()?;
        } else {
            tracing::debug!("No new config files found");
        }

        Ok(added)
    }
}

/// Config files under `root`, depth first with siblings in name order.
///
/// Symlinked directories are not followed, which rules out cycles.
fn scan_root(root: &SourceRoot) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(&root.path)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if !root.recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(root = %root.path.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|path| NormalizedPath::new(path).has_extension(CONFIG_EXTENSION))
        .collect()
}
