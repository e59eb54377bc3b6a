//! List command implementation

use std::path::Path;

use colored::Colorize;

use crate::context::{Notifications, Session};
use crate::error::Result;

/// Run the list command
pub fn run_list(start: &Path, json: bool) -> Result<()> {
    let session = Session::open(start, Notifications::Off)?;
    let entries = session.service.entries();

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No tracked config files".yellow());
        println!();
        println!("Run {} to find them.", "omnisync discover".cyan());
        return Ok(());
    }

    println!("{}", "Tracked Config Files".bold());
    println!();
    for entry in entries {
        let marker = if entry.enabled {
            "[x]".green()
        } else {
            "[ ]".dimmed()
        };
        let auto = if entry.auto_sync_enabled {
            "auto".normal()
        } else {
            "manual".dimmed()
        };
        println!(
            "  {} {:<40} {:<16} {:<6} {}",
            marker,
            entry.file_name.cyan(),
            entry.scope.as_str(),
            auto,
            entry.relative_path.dimmed()
        );
    }

    Ok(())
}
