//! Status command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use omnisync_core::{AutoSyncMode, SyncEngine, SyncEntry};
use serde::Serialize;

use crate::context::{Notifications, Session};
use crate::error::Result;

/// How a tracked file compares with its global copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum FileState {
    InSync,
    Differs,
    LocalOnly,
    GlobalOnly,
    Missing,
}

impl FileState {
    fn of(engine: &SyncEngine, entry: &SyncEntry) -> Self {
        let local = engine.project_path(entry).is_file();
        let global = engine.global_path(entry).is_file();
        match (local, global) {
            (false, false) => Self::Missing,
            (true, false) => Self::LocalOnly,
            (false, true) => Self::GlobalOnly,
            (true, true) if engine.sizes_differ(entry) => Self::Differs,
            (true, true) => Self::InSync,
        }
    }

    fn label(self) -> colored::ColoredString {
        match self {
            Self::InSync => "in sync".green(),
            Self::Differs => "differs".yellow(),
            Self::LocalOnly => "not pushed".yellow(),
            Self::GlobalOnly => "global only".cyan(),
            Self::Missing => "missing".red(),
        }
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    file_name: &'a str,
    relative_path: &'a str,
    enabled: bool,
    scope: &'static str,
    auto_sync: bool,
    state: FileState,
    global_path: PathBuf,
}

#[derive(Serialize)]
struct StatusView<'a> {
    project: &'a str,
    root: &'a Path,
    engine_version: String,
    settings_file: PathBuf,
    global_directory: &'a Path,
    auto_sync_mode: String,
    entries: Vec<EntryView<'a>>,
}

fn describe_mode(mode: AutoSyncMode) -> String {
    match mode {
        AutoSyncMode::Poll { interval } => format!("poll every {}s", interval.as_secs()),
        AutoSyncMode::Watch { debounce } => {
            format!("watch, {}ms debounce", debounce.as_millis())
        }
    }
}

/// Run the status command
pub fn run_status(start: &Path, json: bool) -> Result<()> {
    let session = Session::open(start, Notifications::Off)?;
    let service = &session.service;
    let engine = service.engine();
    let resolver = service.resolver();

    let view = StatusView {
        project: &service.project().name,
        root: &service.project().root,
        engine_version: resolver.engine_version().to_string(),
        settings_file: resolver.settings_file_path(),
        global_directory: resolver.base_directory(),
        auto_sync_mode: describe_mode(service.auto_sync_mode()),
        entries: service
            .entries()
            .iter()
            .map(|entry| EntryView {
                file_name: &entry.file_name,
                relative_path: &entry.relative_path,
                enabled: entry.enabled,
                scope: entry.scope.as_str(),
                auto_sync: entry.auto_sync_enabled,
                state: FileState::of(engine, entry),
                global_path: engine.global_path(entry),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", "OmniSync Status".bold());
    println!();
    println!("{}:   {}", "Project".dimmed(), view.project.cyan());
    println!("{}:      {}", "Root".dimmed(), view.root.display());
    println!("{}:    {}", "Engine".dimmed(), view.engine_version);
    println!("{}:    {}", "Global".dimmed(), view.global_directory.display());
    println!("{}:  {}", "Settings".dimmed(), view.settings_file.display());
    println!("{}: {}", "Auto-sync".dimmed(), view.auto_sync_mode);
    println!();

    let enabled: Vec<&EntryView> = view.entries.iter().filter(|e| e.enabled).collect();
    println!(
        "{}: {} tracked, {} enabled",
        "Files".bold(),
        view.entries.len(),
        enabled.len()
    );
    for entry in enabled {
        println!(
            "   {} {:<40} {:<16} {}",
            if entry.auto_sync { "*".green() } else { "-".dimmed() },
            entry.file_name.cyan(),
            entry.scope,
            entry.state.label()
        );
    }

    Ok(())
}
