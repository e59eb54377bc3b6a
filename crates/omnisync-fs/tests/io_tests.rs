use omnisync_fs::{Error, NormalizedPath, RobustnessConfig, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("OmniSyncSettings.json"));

    io::write_atomic(&path, b"{}", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("settings.json");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_atomic(&path, b"updated", RobustnessConfig::fast()).unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("target.json"));

    io::write_atomic(&path, b"content", RobustnessConfig::fast()).unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {:?}", leftovers);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/OmniSyncSettings.json");
    let result = io::read_text(&path);
    assert!(matches!(result, Err(ref e) if e.is_not_found()));
}

#[test]
fn test_ensure_dir_creates_nested_directories() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("UnrealEngine/OmniSync/PerEngineVersion/5.4");

    io::ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());

    // Second call is a no-op
    io::ensure_dir(&dir).unwrap();
}

#[test]
fn test_ensure_dir_fails_when_path_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("Global");
    fs::write(&blocker, "not a directory").unwrap();

    let result = io::ensure_dir(blocker.join("Config"));
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_copy_file_creates_destination_tree() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("project/Config/Editor.ini");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, "A=1").unwrap();
    let destination = temp.path().join("global/PerProject/MyGame/Config/Editor.ini");

    let bytes = io::copy_file(&source, &destination, RobustnessConfig::default()).unwrap();

    assert_eq!(bytes, 3);
    assert_eq!(fs::read_to_string(&destination).unwrap(), "A=1");
}

#[test]
fn test_copy_file_overwrites_unconditionally() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Game.ini");
    let destination = temp.path().join("copy/Game.ini");
    fs::write(&source, "short").unwrap();
    fs::create_dir_all(destination.parent().unwrap()).unwrap();
    fs::write(&destination, "a much longer previous body").unwrap();

    io::copy_file(&source, &destination, RobustnessConfig::fast()).unwrap();

    assert_eq!(fs::read_to_string(&destination).unwrap(), "short");
}

#[test]
fn test_copy_file_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("Input.ini");
    let destination = temp.path().join("out/Input.ini");
    fs::write(&source, "[/Script/Engine.InputSettings]\nbEnableMouseSmoothing=True\n").unwrap();

    io::copy_file(&source, &destination, RobustnessConfig::fast()).unwrap();
    let first = fs::read(&destination).unwrap();
    io::copy_file(&source, &destination, RobustnessConfig::fast()).unwrap();
    let second = fs::read(&destination).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, fs::read(&source).unwrap());
}

#[test]
fn test_copy_missing_source_does_not_create_destination_dir() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("missing.ini");
    let destination_dir = temp.path().join("never/created");

    let result = io::copy_file(&source, destination_dir.join("missing.ini"), RobustnessConfig::fast());

    assert!(matches!(result, Err(Error::SourceMissing { .. })));
    assert!(!destination_dir.exists());
    assert!(!temp.path().join("never").exists());
}

#[test]
fn test_file_size() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("Scalability.ini");
    fs::write(&file, "12345").unwrap();

    assert_eq!(io::file_size(&file), Some(5));
    assert_eq!(io::file_size(temp.path().join("absent.ini")), None);
}
