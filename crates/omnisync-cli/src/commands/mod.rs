//! Command implementations for omnisync-cli

pub mod discover;
pub mod entry;
pub mod list;
pub mod status;
pub mod sync;
pub mod watch;

pub use discover::run_discover;
pub use entry::{run_auto, run_disable, run_enable, run_scope};
pub use list::run_list;
pub use status::run_status;
pub use sync::{run_pull, run_push};
pub use watch::run_watch;

use colored::Colorize;
use omnisync_core::{EntryStatus, PassOutcome, SyncReport};

/// Print a pass's per-file results followed by its notification line.
pub(crate) fn print_report(report: &SyncReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            EntryStatus::Copied { bytes } => println!(
                "   {} {} {}",
                "+".green(),
                outcome.file_name.cyan(),
                format!("({bytes} bytes)").dimmed()
            ),
            EntryStatus::Skipped { reason } => println!(
                "   {} {} {}",
                "-".yellow(),
                outcome.file_name.cyan(),
                reason.dimmed()
            ),
            EntryStatus::Failed { error } => {
                println!("   {} {} {}", "!".red(), outcome.file_name.cyan(), error)
            }
        }
    }

    let message = report.notification();
    match report.outcome() {
        PassOutcome::Synced(_) => println!("{} {}", "OK".green().bold(), message),
        PassOutcome::NothingToSync => println!("{} {}", "NOTE".yellow().bold(), message),
        PassOutcome::Failed(_) => println!("{} {}", "FAILED".red().bold(), message),
    }
}
