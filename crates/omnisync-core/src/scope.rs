//! Sync scope tiers

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which global subdirectory tier an entry syncs through.
///
/// Persisted as its integer value (`0`, `1`, `2`). Documents that spell the
/// variant name are accepted too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SyncScope {
    /// Shared by every project and engine version
    Global,
    /// Shared by projects on the same `<major>.<minor>` engine
    #[default]
    PerEngineVersion,
    /// Private to one project
    PerProject,
}

impl SyncScope {
    /// All scopes in persisted order.
    pub const ALL: [SyncScope; 3] = [Self::Global, Self::PerEngineVersion, Self::PerProject];

    /// Directory name of the tier under the plugin base directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::PerEngineVersion => "PerEngineVersion",
            Self::PerProject => "PerProject",
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Global => 0,
            Self::PerEngineVersion => 1,
            Self::PerProject => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Global),
            1 => Some(Self::PerEngineVersion),
            2 => Some(Self::PerProject),
            _ => None,
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncScope {
    type Err = String;

    /// Accepts the variant names plus the short CLI spellings
    /// `global`, `engine` and `project`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "0" => Ok(Self::Global),
            "perengineversion" | "engine" | "engine-version" | "1" => Ok(Self::PerEngineVersion),
            "perproject" | "project" | "2" => Ok(Self::PerProject),
            _ => Err(format!(
                "unknown scope '{s}', expected one of: global, engine, project"
            )),
        }
    }
}

impl Serialize for SyncScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for SyncScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScopeVisitor)
    }
}

struct ScopeVisitor;

impl Visitor<'_> for ScopeVisitor {
    type Value = SyncScope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scope index (0, 1, 2) or scope name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<SyncScope, E> {
        u8::try_from(value)
            .ok()
            .and_then(SyncScope::from_u8)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<SyncScope, E> {
        u64::try_from(value)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<SyncScope, E> {
        // Engine-style enum paths look like `EOmniSyncScope::PerProject`
        let name = value.rsplit("::").next().unwrap_or(value);
        name.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}
