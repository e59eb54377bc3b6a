//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use omnisync_core::{AutoSyncMode, SyncScope};

/// OmniSync - Keep Unreal project config files in sync with your global settings
#[derive(Parser, Debug)]
#[command(name = "omnisync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in DIR instead of the current directory
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find config files in the project and start tracking new ones
    Discover,

    /// List tracked config files
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Include files in save and load passes
    ///
    /// Examples:
    ///   omnisync enable DefaultEngine.ini
    ///   omnisync enable DefaultEngine.ini DefaultInput.ini
    Enable {
        /// Bare file names of tracked files
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Exclude files from save and load passes
    Disable {
        /// Bare file names of tracked files
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Choose which global tier a file syncs through
    Scope {
        /// Bare file name of a tracked file
        file: String,

        #[arg(value_enum)]
        scope: ScopeArg,
    },

    /// Turn automatic sync on or off for a file
    Auto {
        /// Bare file name of a tracked file
        file: String,

        #[arg(value_enum)]
        state: Toggle,
    },

    /// Copy enabled files from the project to the global location
    Push {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy enabled files from the global location into the project
    Pull {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show project, paths and per-file sync state
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run automatic sync until interrupted
    Watch {
        /// Override the configured auto-sync mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   omnisync completions bash > ~/.local/share/bash-completion/completions/omnisync
    ///   omnisync completions zsh > ~/.zfunc/_omnisync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Scope names accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    /// Shared by every project and engine version
    Global,
    /// Shared by projects on the same engine version
    Engine,
    /// Private to this project
    Project,
}

impl From<ScopeArg> for SyncScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Global => SyncScope::Global,
            ScopeArg::Engine => SyncScope::PerEngineVersion,
            ScopeArg::Project => SyncScope::PerProject,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

/// Auto-sync strategies
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Compare file sizes on an interval
    Poll,
    /// React to filesystem notifications
    Watch,
}

impl ModeArg {
    /// Mode with the configured timing if it matches, defaults otherwise.
    pub fn to_mode(self, configured: AutoSyncMode) -> AutoSyncMode {
        match (self, configured) {
            (ModeArg::Poll, mode @ AutoSyncMode::Poll { .. }) => mode,
            (ModeArg::Watch, mode @ AutoSyncMode::Watch { .. }) => mode,
            (ModeArg::Poll, _) => AutoSyncMode::poll(),
            (ModeArg::Watch, _) => AutoSyncMode::watch(),
        }
    }
}
