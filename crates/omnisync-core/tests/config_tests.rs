//! Tests for layered configuration and project detection

use std::path::PathBuf;
use std::time::Duration;

use omnisync_core::config::{AutoSyncKind, ConfigResolver, Manifest, ResolvedConfig};
use omnisync_core::{AutoSyncMode, EngineVersion, Error, ProjectContext};
use omnisync_test_utils::TestProject;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

mod manifest_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manifest_parse_all_sections() {
        let manifest = Manifest::parse(
            r#"
[paths]
settings_root = "/srv/settings"
vendor = "Studio"
plugin_name = "Sync"

[project]
name = "Racer"
engine_version = "5.3"

[auto_sync]
mode = "watch"
debounce_ms = 250
"#,
        )
        .unwrap();

        assert_eq!(manifest.paths.settings_root, Some(PathBuf::from("/srv/settings")));
        assert_eq!(manifest.paths.vendor.as_deref(), Some("Studio"));
        assert_eq!(manifest.project.name.as_deref(), Some("Racer"));
        assert_eq!(manifest.auto_sync.mode, Some(AutoSyncKind::Watch));
        assert_eq!(manifest.auto_sync.debounce_ms, Some(250));
    }

    #[test]
    fn test_manifest_rejects_unknown_mode() {
        assert!(Manifest::parse("[auto_sync]\nmode = \"push\"").is_err());
    }
}

mod resolved_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ResolvedConfig::from_manifest(&Manifest::default()).unwrap();

        assert_eq!(config.vendor, "UnrealEngine");
        assert_eq!(config.plugin_name, "OmniSync");
        assert_eq!(config.auto_sync_mode(), AutoSyncMode::poll());
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let poll = Manifest::parse("[auto_sync]\npoll_interval_secs = 0").unwrap();
        let debounce = Manifest::parse("[auto_sync]\ndebounce_ms = 0").unwrap();

        assert!(matches!(
            ResolvedConfig::from_manifest(&poll),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            ResolvedConfig::from_manifest(&debounce),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_oversized_intervals_are_rejected() {
        let poll = Manifest::parse("[auto_sync]\npoll_interval_secs = 9223372036854775807").unwrap();
        let debounce = Manifest::parse("[auto_sync]\ndebounce_ms = 600001").unwrap();

        assert!(matches!(
            ResolvedConfig::from_manifest(&poll),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            ResolvedConfig::from_manifest(&debounce),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_interval_limits_are_inclusive() {
        let manifest =
            Manifest::parse("[auto_sync]\npoll_interval_secs = 86400\ndebounce_ms = 600000").unwrap();

        let config = ResolvedConfig::from_manifest(&manifest).unwrap();

        assert_eq!(config.poll_interval, AutoSyncMode::MAX_POLL_INTERVAL);
        assert_eq!(config.debounce, AutoSyncMode::MAX_DEBOUNCE);
    }

    #[test]
    fn test_bad_engine_version_is_rejected() {
        let manifest = Manifest::parse("[project]\nengine_version = \"latest\"").unwrap();

        assert!(matches!(
            ResolvedConfig::from_manifest(&manifest),
            Err(Error::InvalidEngineVersion { .. })
        ));
    }

    #[test]
    fn test_path_resolver_needs_engine_version() {
        let config = ResolvedConfig {
            settings_root: Some(PathBuf::from("/settings")),
            ..ResolvedConfig::default()
        };
        let project = ProjectContext::new("/work/Shooter", "Shooter");

        assert!(config.path_resolver(&project).is_err());

        let resolver = config
            .path_resolver(&project.with_engine_version(EngineVersion::new(5, 4)))
            .unwrap();
        assert_eq!(
            resolver.settings_file_path(),
            PathBuf::from("/settings/UnrealEngine/OmniSync/PerProject/Shooter/OmniSyncSettings.json")
        );
    }

    #[test]
    fn test_overrides_apply_to_project() {
        let config = ResolvedConfig {
            project_name: Some("Alias".into()),
            engine_version: Some(EngineVersion::new(4, 27)),
            ..ResolvedConfig::default()
        };

        let project = config.apply_to(ProjectContext::new("/work/Shooter", "Shooter"));

        assert_eq!(project.name, "Alias");
        assert_eq!(project.engine_version, Some(EngineVersion::new(4, 27)));
    }
}

mod resolver_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_layer_overrides_project_layer() {
        let project = TestProject::new("Shooter");
        let user_dir = TempDir::new().unwrap();
        std::fs::write(
            user_dir.path().join("config.toml"),
            "[auto_sync]\nmode = \"watch\"\ndebounce_ms = 800\n",
        )
        .unwrap();
        project.write(".omnisync/config.toml", "[auto_sync]\ndebounce_ms = 300\n");
        project.write(".omnisync/config.local.toml", "[project]\nengine_version = \"5.2\"\n");

        let config = ConfigResolver::with_user_config_dir(project.root(), user_dir.path().to_path_buf())
            .resolve()
            .unwrap();

        assert_eq!(config.auto_sync, AutoSyncKind::Watch);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.engine_version, Some(EngineVersion::new(5, 2)));
    }

    #[test]
    fn test_missing_layers_yield_defaults() {
        let project = TestProject::new("Shooter");
        let user_dir = TempDir::new().unwrap();

        let config = ConfigResolver::with_user_config_dir(project.root(), user_dir.path().to_path_buf())
            .resolve()
            .unwrap();

        assert_eq!(config, ResolvedConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let project = TestProject::new("Shooter");
        let user_dir = TempDir::new().unwrap();
        project.write(".omnisync/config.toml", "[paths\n");

        let result = ConfigResolver::with_user_config_dir(project.root(), user_dir.path().to_path_buf())
            .resolve();

        assert!(matches!(
            result,
            Err(Error::Fs(omnisync_fs::Error::ConfigParse { .. }))
        ));
    }
}

mod project_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_reads_descriptor() {
        let project = TestProject::new("Shooter");
        project.write("Source/Shooter/Shooter.cpp", "");

        let context = ProjectContext::detect(&project.root().join("Source/Shooter")).unwrap();

        assert_eq!(context.name, "Shooter");
        assert_eq!(context.engine_version, Some(EngineVersion::new(5, 4)));
        assert!(context.config_dir().ends_with("Config"));
    }
}
