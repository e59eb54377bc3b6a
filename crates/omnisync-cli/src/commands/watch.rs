//! Watch command implementation
//!
//! Keeps the service alive and pumps it on a short tick until Ctrl-C.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use colored::Colorize;

use super::print_report;
use crate::cli::ModeArg;
use crate::context::{Notifications, Session};
use crate::error::Result;

/// How often the service is pumped
const TICK: Duration = Duration::from_millis(100);

/// Run the watch command
pub fn run_watch(start: &Path, mode: Option<ModeArg>) -> Result<()> {
    let mut session = Session::open(start, Notifications::Live)?;

    if let Some(mode) = mode {
        let mode = mode.to_mode(session.config.auto_sync_mode());
        session.service.set_auto_sync_mode(mode, Instant::now())?;
    }

    if !session.service.enable_auto_sync(Instant::now())? {
        println!(
            "{} No enabled file has auto-sync on; nothing to watch.",
            "NOTE".yellow().bold()
        );
        println!("Run {} first.", "omnisync enable <file>".cyan());
        return Ok(());
    }

    println!(
        "{} Auto-sync running for {} ({:?}). Press Ctrl-C to stop.",
        "=>".blue().bold(),
        session.service.project().name.cyan(),
        session.service.auto_sync_mode()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(pump_until_interrupted(&mut session))?;

    println!("{} Auto-sync stopped.", "OK".green().bold());
    Ok(())
}

async fn pump_until_interrupted(session: &mut Session) -> Result<()> {
    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                tracing::info!("Received Ctrl-C, shutting down");
                session.service.shutdown();
                return Ok(());
            }

            _ = tick.tick() => {
                for report in session.service.pump(Instant::now()) {
                    println!();
                    println!(
                        "{} {}",
                        Local::now().format("%H:%M:%S").to_string().dimmed(),
                        "Auto-sync pass".bold()
                    );
                    print_report(&report);
                }
            }
        }
    }
}
