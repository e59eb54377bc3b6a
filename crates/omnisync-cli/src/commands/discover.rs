//! Discover command implementation

use std::path::Path;

use colored::Colorize;

use crate::context::{Notifications, Session};
use crate::error::Result;

/// Run the discover command
///
/// Opening the session already scans the project; this reports what was
/// found and lists the files that are not enabled yet.
pub fn run_discover(start: &Path) -> Result<()> {
    println!("{} Scanning for config files...", "=>".blue().bold());

    let session = Session::open(start, Notifications::Off)?;
    let summary = session.summary;

    if summary.resolved > 0 {
        println!(
            "{} Resolved paths for {} previously tracked file(s)",
            "OK".green().bold(),
            summary.resolved
        );
    }

    if summary.discovered == 0 {
        println!("{} No new config files found.", "OK".green().bold());
        return Ok(());
    }

    println!(
        "{} Tracking {} new config file(s):",
        "OK".green().bold(),
        summary.discovered
    );
    let entries = session.service.entries();
    for entry in &entries[entries.len() - summary.discovered..] {
        println!(
            "   {} {} {}",
            "+".green(),
            entry.file_name.cyan(),
            entry.relative_path.dimmed()
        );
    }
    println!();
    println!("Run {} to start syncing them.", "omnisync enable <file>".cyan());

    Ok(())
}
