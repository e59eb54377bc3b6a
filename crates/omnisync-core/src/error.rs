//! Error types for omnisync-core

use std::path::PathBuf;

/// Result type for omnisync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in omnisync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No settings document has been written for this project yet
    #[error("Settings file not found at {path}")]
    SettingsNotFound { path: PathBuf },

    /// Engine version string could not be reduced to `<major>.<minor>`
    #[error("Invalid engine version: {value}")]
    InvalidEngineVersion { value: String },

    /// No `.uproject` file above the starting directory
    #[error("No project file found at or above {path}")]
    ProjectNotFound { path: PathBuf },

    /// The platform user settings directory could not be determined
    #[error("Could not determine the user settings directory")]
    NoSettingsRoot,

    /// Change notifier failed to register or release a watch
    #[error("Watch error on {path}: {message}")]
    Watch { path: PathBuf, message: String },

    /// Configuration value out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from omnisync-fs
    #[error(transparent)]
    Fs(#[from] omnisync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
