//! Filesystem primitives for OmniSync
//!
//! Provides forward-slash path handling, locked atomic writes, whole-file
//! copies with transient-error retry, and format-agnostic settings storage.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigStore, DocumentFormat};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
