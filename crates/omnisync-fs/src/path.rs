//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Relative paths stored in the settings document and joined onto scoped
/// directories go through this type, so the same entry resolves to the same
/// file on every platform. Conversion to a platform-native `PathBuf` happens
/// only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes and repeated separators collapse.
    /// A leading `//` is kept so UNC paths stay recognizable.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: clean(&path.as_ref().to_string_lossy()),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// True for the empty path.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        let segment = segment.replace('\\', "/");
        let segment = segment.trim_start_matches('/');
        if segment.is_empty() {
            return self.clone();
        }
        Self {
            inner: clean(&format!("{}/{}", self.inner, segment)),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Express this path relative to `base`.
    ///
    /// Matching is done on whole components, so `/a/bc` is not inside `/a/b`.
    /// Returns `None` when the path is not below `base`.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<Self> {
        let base_str = base.as_str();
        let trimmed = base_str.trim_end_matches('/');

        if trimmed.is_empty() {
            return if base_str.starts_with('/') {
                self.inner.strip_prefix('/').map(Self::new)
            } else {
                Some(self.clone())
            };
        }

        let rest = self.inner.strip_prefix(trimmed)?;
        if rest.is_empty() {
            return Some(Self {
                inner: String::new(),
            });
        }
        rest.strip_prefix('/').map(Self::new)
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Check if this appears to be a network path.
    ///
    /// The global location is allowed to live on mounted storage; callers
    /// only use this to log a hint.
    pub fn is_network_path(&self) -> bool {
        self.inner.starts_with("//")
            || self.inner.starts_with("smb://")
            || self.inner.starts_with("nfs://")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Case-insensitive extension check (`"ini"` matches `Game.INI`).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .is_some_and(|found| found.eq_ignore_ascii_case(ext))
    }
}

fn clean(raw: &str) -> String {
    let replaced = raw.replace('\\', "/");
    let (prefix, rest) = if replaced.starts_with("//") && !replaced.starts_with("///") {
        ("//", &replaced[2..])
    } else if let Some(rest) = replaced.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", replaced.as_str())
    };

    let body = rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    format!("{prefix}{body}")
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_separators() {
        assert_eq!(clean("a//b///c/"), "a/b/c");
        assert_eq!(clean("///a"), "/a");
        assert_eq!(clean("//server/share"), "//server/share");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn relative_to_requires_component_boundary() {
        let path = NormalizedPath::new("/a/bc/file.ini");
        assert!(path.relative_to(&NormalizedPath::new("/a/b")).is_none());
        assert_eq!(
            path.relative_to(&NormalizedPath::new("/a/")).unwrap().as_str(),
            "bc/file.ini"
        );
    }
}
