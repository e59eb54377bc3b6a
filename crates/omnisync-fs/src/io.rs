//! Atomic writes, whole-file copies and directory helpers

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning for operations that may race with another process writing the
/// same file (the editor flushing its config while we copy it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// Take an advisory exclusive lock on the temp file during atomic writes.
    pub enable_locking: bool,
    /// First delay between retries of a transient I/O failure.
    pub initial_retry_interval: Duration,
    /// Give up retrying after this much time has passed.
    pub max_retry_elapsed: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            enable_locking: true,
            initial_retry_interval: Duration::from_millis(25),
            max_retry_elapsed: Duration::from_secs(1),
        }
    }
}

impl RobustnessConfig {
    /// Single attempt, no locking.
    pub fn fast() -> Self {
        Self {
            enable_locking: false,
            initial_retry_interval: Duration::ZERO,
            max_retry_elapsed: Duration::ZERO,
        }
    }
}

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so readers never observe a partial
/// document. Parent directories are created as needed.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        ensure_dir(parent)?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    if config.enable_locking {
        temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;
    }

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    if config.enable_locking {
        temp_file.unlock().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;
    }
    drop(temp_file);

    with_retry(config, &native_path, || fs::rename(&temp_path, &native_path)).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Make sure `dir` exists as a directory, creating missing ancestors.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Copy `source` over `destination`, replacing whatever was there.
///
/// Fails with [`Error::SourceMissing`] before touching the destination side
/// when `source` is not a regular file. Returns the number of bytes copied.
pub fn copy_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    config: RobustnessConfig,
) -> Result<u64> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if !source.is_file() {
        return Err(Error::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }

    let bytes = with_retry(config, destination, || fs::copy(source, destination))?;
    tracing::trace!(source = %source.display(), destination = %destination.display(), bytes, "copied file");
    Ok(bytes)
}

/// Size in bytes of a regular file, `None` if it is missing or not a file.
pub fn file_size(path: impl AsRef<Path>) -> Option<u64> {
    fs::metadata(path.as_ref())
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}

fn with_retry<T>(
    config: RobustnessConfig,
    path: &Path,
    mut op: impl FnMut() -> std::io::Result<T>,
) -> Result<T> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(config.initial_retry_interval)
        .with_max_elapsed_time(Some(config.max_retry_elapsed))
        .build();

    backoff::retry(policy, || op().map_err(classify)).map_err(|e| match e {
        backoff::Error::Permanent(err) => Error::io(path, err),
        backoff::Error::Transient { err, .. } => Error::io(path, err),
    })
}

fn classify(err: std::io::Error) -> backoff::Error<std::io::Error> {
    if is_transient(&err) {
        tracing::debug!(error = %err, "transient I/O failure, retrying");
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    if matches!(
        err.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    ) {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION while the editor holds the file
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
