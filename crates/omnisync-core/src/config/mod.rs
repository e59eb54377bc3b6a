//! Layered tool configuration
//!
//! Configuration is loaded and merged from these sources (later sources
//! override earlier):
//!
//! 1. **User defaults** - `<config_dir>/omnisync/config.toml`
//! 2. **Project config** - `.omnisync/config.toml`
//! 3. **Local overrides** - `.omnisync/config.local.toml`
//! 4. **Environment** - `OMNISYNC_SETTINGS_ROOT`
//!
//! # Example
//!
//! ```toml
//! [paths]
//! settings_root = "/mnt/shared/settings"
//!
//! [project]
//! engine_version = "5.4"
//!
//! [auto_sync]
//! mode = "watch"
//! debounce_ms = 500
//! ```

mod manifest;
mod resolver;

pub use manifest::{AutoSyncKind, AutoSyncSection, Manifest, PathsSection, ProjectSection};
pub use resolver::{ConfigResolver, PROJECT_CONFIG_DIR, ResolvedConfig, SETTINGS_ROOT_ENV};
