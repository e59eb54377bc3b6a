//! Tests for config file discovery

use omnisync_core::{ConfigDiscoverer, EngineVersion, ProjectContext, SyncEntry, SyncEntryStore, SyncScope};
use omnisync_test_utils::TestProject;
use pretty_assertions::assert_eq;

fn discoverer(project: &TestProject) -> ConfigDiscoverer {
    let context = ProjectContext::new(project.root(), project.name())
        .with_engine_version(EngineVersion::new(5, 4));
    ConfigDiscoverer::new(&context)
}

fn relative_paths(project: &TestProject) -> Vec<String> {
    let discoverer = discoverer(project);
    discoverer
        .discover_all_config_paths()
        .iter()
        .map(|p| discoverer.relative_path_for(p).unwrap())
        .collect()
}

#[test]
fn test_discovers_all_roots_in_order() {
    let project = TestProject::new("Shooter").with_default_layout();

    assert_eq!(
        relative_paths(&project),
        vec![
            "Config/DefaultEngine.ini",
            "Config/DefaultGame.ini",
            "Saved/Config/WindowsEditor/EditorPerProjectUserSettings.ini",
            "Plugins/Gameplay/Config/DefaultGameplay.ini",
        ]
    );
}

#[test]
fn test_primary_config_dir_is_not_recursive() {
    let project = TestProject::new("Shooter");
    project.write("Config/DefaultEngine.ini", "");
    project.write("Config/Windows/WindowsEngine.ini", "");

    assert_eq!(relative_paths(&project), vec!["Config/DefaultEngine.ini"]);
}

#[test]
fn test_only_ini_files_are_discovered() {
    let project = TestProject::new("Shooter");
    project.write("Config/DefaultEngine.ini", "");
    project.write("Config/DefaultEngine.INI.txt", "");
    project.write("Config/Readme.md", "");
    project.write("Saved/Config/Windows/Game.json", "");

    assert_eq!(relative_paths(&project), vec!["Config/DefaultEngine.ini"]);
}

#[test]
fn test_transient_files_are_skipped_in_saved_and_plugins() {
    let project = TestProject::new("Shooter");
    project.write("Saved/Config/Windows/Game.ini", "");
    project.write("Saved/Config/Windows/Game.bak.ini", "");
    project.write("Saved/Config/Windows/Input.tmp.ini", "");
    project.write("Saved/Config/Windows/Editor~.ini", "");
    project.write("Plugins/Tools/Config/Tools.bak.ini", "");

    assert_eq!(relative_paths(&project), vec!["Saved/Config/Windows/Game.ini"]);
}

#[test]
fn test_plugin_files_outside_config_dirs_are_ignored() {
    let project = TestProject::new("Shooter");
    project.write("Plugins/Tools/Config/DefaultTools.ini", "");
    project.write("Plugins/Tools/Resources/Icons.ini", "");
    project.write("Plugins/Tools/Tools.ini", "");

    assert_eq!(relative_paths(&project), vec!["Plugins/Tools/Config/DefaultTools.ini"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_are_not_followed() {
    let project = TestProject::new("Shooter");
    project.write("Saved/Config/Windows/Game.ini", "");
    std::os::unix::fs::symlink(
        project.root().join("Saved/Config/Windows"),
        project.root().join("Saved/Config/Windows/Loop"),
    )
    .unwrap();

    assert_eq!(relative_paths(&project), vec!["Saved/Config/Windows/Game.ini"]);
}

#[test]
fn test_missing_roots_yield_nothing() {
    let project = TestProject::new("Empty");

    assert!(discoverer(&project).discover_all_config_paths().is_empty());
}

#[test]
fn test_find_config_file_prefers_earlier_roots() {
    let project = TestProject::new("Shooter");
    project.write("Config/DefaultInput.ini", "primary");
    project.write("Plugins/Tools/Config/DefaultInput.ini", "plugin");

    let discoverer = discoverer(&project);
    let found = discoverer.find_config_file("DefaultInput.ini").unwrap();

    assert_eq!(found, project.root().join("Config").join("DefaultInput.ini"));
    assert!(discoverer.find_config_file("Missing.ini").is_none());
}

#[test]
fn test_discover_and_add_registers_new_files_disabled() {
    let project = TestProject::new("Shooter").with_default_layout();
    let mut store = SyncEntryStore::new(project.settings_file());

    let added = discoverer(&project).discover_and_add(&mut store).unwrap();

    assert_eq!(added, 4);
    let entry = store.get("DefaultEngine.ini").unwrap();
    assert_eq!(entry.relative_path, "Config/DefaultEngine.ini");
    assert!(!entry.enabled);
    assert!(entry.auto_sync_enabled);
    assert_eq!(entry.scope, SyncScope::PerEngineVersion);
    assert!(project.settings_file().is_file());
}

#[test]
fn test_discover_and_add_is_idempotent() {
    let project = TestProject::new("Shooter").with_default_layout();
    let mut store = SyncEntryStore::new(project.settings_file());
    let discoverer = discoverer(&project);

    assert_eq!(discoverer.discover_and_add(&mut store).unwrap(), 4);
    assert_eq!(discoverer.discover_and_add(&mut store).unwrap(), 0);
    assert_eq!(store.len(), 4);
}

#[test]
fn test_discover_and_add_deduplicates_by_file_name() {
    let project = TestProject::new("Shooter");
    project.write("Config/DefaultInput.ini", "");
    project.write("Plugins/Tools/Config/DefaultInput.ini", "");
    let mut store = SyncEntryStore::new(project.settings_file());
    store.insert(SyncEntry::new("DefaultGame.ini", "Config/DefaultGame.ini").with_enabled(true));
    project.write("Config/DefaultGame.ini", "");

    let added = discoverer(&project).discover_and_add(&mut store).unwrap();

    assert_eq!(added, 1);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("DefaultInput.ini").unwrap().relative_path, "Config/DefaultInput.ini");
    assert!(store.get("DefaultGame.ini").unwrap().enabled);
}

#[test]
fn test_discover_and_add_without_new_files_does_not_save() {
    let project = TestProject::new("Shooter");
    let mut store = SyncEntryStore::new(project.settings_file());

    let added = discoverer(&project).discover_and_add(&mut store).unwrap();

    assert_eq!(added, 0);
    assert!(!project.settings_file().exists());
}

#[test]
fn test_resolve_missing_paths_fills_only_empty_paths() {
    let project = TestProject::new("Shooter").with_default_layout();
    let mut store = SyncEntryStore::new(project.settings_file());
    store.insert(SyncEntry::new("DefaultGameplay.ini", ""));
    store.insert(SyncEntry::new("DefaultEngine.ini", "Custom/DefaultEngine.ini"));
    store.insert(SyncEntry::new("Gone.ini", ""));

    let resolved = store.resolve_missing_paths(&discoverer(&project));

    assert_eq!(resolved, 1);
    assert_eq!(
        store.get("DefaultGameplay.ini").unwrap().relative_path,
        "Plugins/Gameplay/Config/DefaultGameplay.ini"
    );
    assert_eq!(store.get("DefaultEngine.ini").unwrap().relative_path, "Custom/DefaultEngine.ini");
    assert_eq!(store.get("Gone.ini").unwrap().relative_path, "");
}
