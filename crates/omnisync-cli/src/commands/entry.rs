//! Per-file setting commands: enable, disable, scope and auto
//!
//! Each command edits the store, then applies it the way a settings change
//! in the editor would: the store is saved and, while any file has
//! auto-sync on, a save pass runs immediately.

use std::path::Path;
use std::time::Instant;

use colored::Colorize;
use omnisync_core::{SyncEntryStore, SyncScope};

use super::print_report;
use crate::context::{Notifications, Session};
use crate::error::{CliError, Result};

/// Run the enable command
pub fn run_enable(start: &Path, files: &[String]) -> Result<()> {
    update(start, files, |store, file| store.set_enabled(file, true), "Enabled")
}

/// Run the disable command
pub fn run_disable(start: &Path, files: &[String]) -> Result<()> {
    update(start, files, |store, file| store.set_enabled(file, false), "Disabled")
}

/// Run the scope command
pub fn run_scope(start: &Path, file: &str, scope: SyncScope) -> Result<()> {
    update(
        start,
        &[file.to_string()],
        |store, file| store.set_scope(file, scope),
        &format!("Scope {scope} set for"),
    )
}

/// Run the auto command
pub fn run_auto(start: &Path, file: &str, enabled: bool) -> Result<()> {
    let verb = if enabled {
        "Auto-sync on for"
    } else {
        "Auto-sync off for"
    };
    update(
        start,
        &[file.to_string()],
        |store, file| store.set_auto_sync(file, enabled),
        verb,
    )
}

fn update(
    start: &Path,
    files: &[String],
    apply: impl Fn(&mut SyncEntryStore, &str) -> bool,
    verb: &str,
) -> Result<()> {
    let mut session = Session::open(start, Notifications::Off)?;

    let unknown: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|file| !session.service.store().contains(file))
        .collect();
    if !unknown.is_empty() {
        return Err(CliError::user(format!(
            "Not tracked: {}. Run `omnisync discover` or check `omnisync list`.",
            unknown.join(", ")
        )));
    }

    for file in files {
        apply(session.service.store_mut(), file);
        println!("{} {} {}", "OK".green().bold(), verb, file.cyan());
    }

    if let Some(report) = session.service.on_settings_changed(Instant::now())? {
        println!();
        println!("{} Auto-sync is on, pushing to the global location...", "=>".blue().bold());
        print_report(&report);
    }

    Ok(())
}
