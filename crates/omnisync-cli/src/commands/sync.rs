//! Push and pull command implementations

use std::path::Path;

use colored::Colorize;
use omnisync_core::{PassOutcome, SyncReport};

use super::print_report;
use crate::context::{Notifications, Session};
use crate::error::{CliError, Result};

/// Run the push command
///
/// Copies every enabled file from the project to its global location.
pub fn run_push(start: &Path, json: bool) -> Result<()> {
    let mut session = Session::open(start, Notifications::Off)?;
    if !json {
        println!(
            "{} Saving config files to {}...",
            "=>".blue().bold(),
            session.service.resolver().base_directory().display()
        );
    }
    let report = session.service.save_settings_to_global();
    finish(&report, json)
}

/// Run the pull command
///
/// Copies every enabled file from its global location into the project.
pub fn run_pull(start: &Path, json: bool) -> Result<()> {
    let mut session = Session::open(start, Notifications::Off)?;
    if !json {
        println!(
            "{} Loading config files from {}...",
            "=>".blue().bold(),
            session.service.resolver().base_directory().display()
        );
    }
    let report = session.service.load_settings_from_global();
    finish(&report, json)
}

fn finish(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report);
    }

    match report.outcome() {
        PassOutcome::Failed(_) => Err(CliError::user(report.notification())),
        PassOutcome::Synced(_) | PassOutcome::NothingToSync => Ok(()),
    }
}
