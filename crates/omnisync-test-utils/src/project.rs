//! [`TestProject`] builder for OmniSync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Engine association written into every test project descriptor.
pub const TEST_ENGINE_VERSION: &str = "5.4";

/// A temporary project directory next to a temporary settings root.
///
/// Both directories are removed when the value is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use omnisync_test_utils::TestProject;
///
/// let project = TestProject::new("Shooter").with_default_layout();
/// project.assert_file_exists("Config/DefaultEngine.ini");
/// ```
pub struct TestProject {
    project_dir: TempDir,
    settings_dir: TempDir,
    name: String,
}

impl TestProject {
    /// Create a project named `name` with a `<name>.uproject` descriptor.
    pub fn new(name: &str) -> Self {
        let project = Self {
            project_dir: TempDir::new().unwrap(),
            settings_dir: TempDir::new().unwrap(),
            name: name.to_string(),
        };
        project.write(
            &format!("{name}.uproject"),
            &format!(
                "{{\n  \"FileVersion\": 3,\n  \"EngineAssociation\": \"{TEST_ENGINE_VERSION}\"\n}}\n"
            ),
        );
        project
    }

    /// Add the usual config files across all three discovery roots.
    ///
    /// - `Config/DefaultEngine.ini`, `Config/DefaultGame.ini`
    /// - `Saved/Config/WindowsEditor/EditorPerProjectUserSettings.ini`
    /// - `Plugins/Gameplay/Config/DefaultGameplay.ini`
    pub fn with_default_layout(self) -> Self {
        self.write("Config/DefaultEngine.ini", "[/Script/Engine.Engine]\nbUseFixedFrameRate=False\n");
        self.write("Config/DefaultGame.ini", "[/Script/EngineSettings.GeneralProjectSettings]\nProjectName=Test\n");
        self.write(
            "Saved/Config/WindowsEditor/EditorPerProjectUserSettings.ini",
            "[/Script/UnrealEd.EditorStyleSettings]\nbUseGrid=True\n",
        );
        self.write(
            "Plugins/Gameplay/Config/DefaultGameplay.ini",
            "[/Script/Gameplay.Settings]\nEnabled=True\n",
        );
        self
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.project_dir.path()
    }

    /// Settings root the global tree is created under.
    pub fn settings_root(&self) -> &Path {
        self.settings_dir.path()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<settings_root>/UnrealEngine/OmniSync`
    pub fn plugin_dir(&self) -> PathBuf {
        self.settings_root().join("UnrealEngine").join("OmniSync")
    }

    /// Per-engine-version directory for [`TEST_ENGINE_VERSION`].
    pub fn engine_dir(&self) -> PathBuf {
        self.plugin_dir().join("PerEngineVersion").join(TEST_ENGINE_VERSION)
    }

    /// Per-project directory, which also holds the settings document.
    pub fn per_project_dir(&self) -> PathBuf {
        self.plugin_dir().join("PerProject").join(&self.name)
    }

    /// Location of the settings document.
    pub fn settings_file(&self) -> PathBuf {
        self.per_project_dir().join("OmniSyncSettings.json")
    }

    /// Write `content` to `relative` under the project root, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.root().join(relative), content)
    }

    /// Read a file under the project root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let path = self.root().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Delete a file under the project root.
    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).unwrap();
    }

    /// Assert that `relative` exists under the project root.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.root().join(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `relative` has exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_file_content(&self, relative: &str, content: &str) {
        assert_eq!(self.read(relative), content, "content of {relative}");
    }
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
