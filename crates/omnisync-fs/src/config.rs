//! Structured documents on disk
//!
//! The sync settings are JSON and the tool configuration layers are TOML;
//! both go through [`ConfigStore`], which picks the codec from the file
//! extension and writes atomically.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Serialization format of a document, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Format for `path`, matched case-insensitively on the extension.
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        if extension.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if extension.eq_ignore_ascii_case("toml") {
            Ok(Self::Toml)
        } else {
            Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            })
        }
    }

    fn decode<T: DeserializeOwned>(self, content: &str) -> std::result::Result<T, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    fn encode<T: Serialize>(self, value: &T) -> std::result::Result<String, String> {
        let mut text = match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string())?,
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string())?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
        })
    }
}

/// Reads and writes serde documents in the format their extension names.
#[derive(Debug, Default)]
pub struct ConfigStore {
    robustness: io::RobustnessConfig,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose writes use `robustness` for locking and retries.
    pub fn with_robustness(robustness: io::RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Read and decode the document at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] for an unknown extension, the read error
    /// (check [`Error::is_not_found`] for a missing file), or
    /// [`Error::ConfigParse`] for malformed content.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = DocumentFormat::from_path(path)?;
        let content = io::read_text(path)?;
        format.decode(&content).map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.to_string(),
            message,
        })
    }

    /// Encode `value` and replace the document at `path` atomically,
    /// creating parent directories as needed.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = DocumentFormat::from_path(path)?;
        let content = format.encode(value).map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.to_string(),
            message,
        })?;
        io::write_atomic(path, content.as_bytes(), self.robustness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension_ignores_case() {
        let upper = NormalizedPath::new("PerProject/Shooter/OmniSyncSettings.JSON");
        assert_eq!(DocumentFormat::from_path(&upper).unwrap(), DocumentFormat::Json);
        let toml = NormalizedPath::new(".omnisync/config.toml");
        assert_eq!(DocumentFormat::from_path(&toml).unwrap(), DocumentFormat::Toml);
    }

    #[test]
    fn ini_is_not_a_document_format() {
        let ini = NormalizedPath::new("Config/DefaultEngine.ini");
        assert!(matches!(
            DocumentFormat::from_path(&ini),
            Err(Error::UnsupportedFormat { .. })
        ));
    }
}
