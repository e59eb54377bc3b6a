//! Sync engine for OmniSync
//!
//! Keeps selected `.ini` files of an Unreal project in step with a per-user
//! global settings directory, so editor preferences follow the user across
//! projects and engine versions.
//!
//! - **Discovery**: finds config files under `Config/`, `Saved/Config/` and
//!   `Plugins/*/Config/`
//! - **Store**: the tracked entries, persisted as a JSON settings document
//! - **Engine**: save and load passes between the project and the global tiers
//! - **Scheduler**: poll or watch driven auto-sync
//! - **Service**: ties the above together for one project
//!
//! # Architecture
//!
//! ```text
//!                  omnisync-cli
//!                       |
//!                 omnisync-core
//!                       |
//!                  omnisync-fs
//! ```
//!
//! # Global layout
//!
//! ```text
//! <settings_root>/<vendor>/<plugin>/
//!     Global/<relative_path>
//!     PerEngineVersion/<major>.<minor>/<relative_path>
//!     PerProject/<project>/<relative_path>
//!     PerProject/<project>/<plugin>Settings.json
//! ```

pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod paths;
pub mod project;
pub mod scheduler;
pub mod scope;
pub mod service;
pub mod store;
pub mod timer;
pub mod watch;

pub use config::{ConfigResolver, Manifest, ResolvedConfig};
pub use discovery::{ConfigDiscoverer, SourceRoot};
pub use engine::{EntryOutcome, EntryStatus, PassOutcome, SyncDirection, SyncEngine, SyncReport};
pub use error::{Error, Result};
pub use paths::{EngineVersion, PathResolver};
pub use project::ProjectContext;
pub use scheduler::{AutoSyncMode, AutoSyncScheduler, AutoSyncState};
pub use scope::SyncScope;
pub use service::{InitSummary, SyncService};
pub use store::{SettingsDocument, SyncEntry, SyncEntryStore};
pub use timer::{TimerHandle, TimerQueue};
pub use watch::{ChangeEvent, ChangeKind, ChangeNotifier, FsChangeNotifier, HostNotifier};
