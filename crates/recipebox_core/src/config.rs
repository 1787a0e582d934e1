//! Storage configuration for the recipe store.
//!
//! # Responsibility
//! - Describe where the recipe database lives and how connections behave.
//! - Resolve defaults from the process environment for app bootstrap.
//!
//! # Invariants
//! - An empty or whitespace-only `RECIPEBOX_DB_PATH` is treated as unset.
//! - Invalid `RECIPEBOX_BUSY_TIMEOUT_MS` values fall back to the default.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the database file path.
pub const DB_PATH_ENV: &str = "RECIPEBOX_DB_PATH";
/// Environment variable overriding the SQLite busy timeout in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "RECIPEBOX_BUSY_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "recipebox.sqlite3";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Physical location of the recipe database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database; contents vanish on disconnect.
    Memory,
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => write!(f, ":memory:"),
        }
    }
}

/// Connection settings consumed by `RecipeService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DbLocation,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// File-backed configuration with default connection settings.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: DbLocation::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// In-memory configuration, mostly for tests and previews.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Resolves configuration from `RECIPEBOX_DB_PATH` and
    /// `RECIPEBOX_BUSY_TIMEOUT_MS`.
    ///
    /// Falls back to `<temp dir>/recipebox.sqlite3` and a 5s busy timeout.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup(DB_PATH_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let busy_timeout = lookup(BUSY_TIMEOUT_ENV)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT);

        Self {
            location: DbLocation::File(path),
            busy_timeout,
        }
    }

    /// Overrides how long SQLite waits on a locked database.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Short label used in log events (`file` or `memory`).
    pub(crate) fn mode_label(&self) -> &'static str {
        match self.location {
            DbLocation::File(_) => "file",
            DbLocation::Memory => "memory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DbLocation, StoreConfig, BUSY_TIMEOUT_ENV, DB_PATH_ENV};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn from_lookup_uses_explicit_path_and_timeout() {
        let config = StoreConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some(" /data/rezepte.db ".to_string()),
            BUSY_TIMEOUT_ENV => Some("250".to_string()),
            _ => None,
        });
        assert_eq!(
            config.location,
            DbLocation::File(PathBuf::from("/data/rezepte.db"))
        );
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn from_lookup_falls_back_for_blank_or_invalid_values() {
        let config = StoreConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("   ".to_string()),
            BUSY_TIMEOUT_ENV => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(
            config.location,
            DbLocation::File(std::env::temp_dir().join("recipebox.sqlite3"))
        );
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn with_busy_timeout_keeps_location() {
        let config = StoreConfig::file("/data/rezepte.db").with_busy_timeout(Duration::ZERO);
        assert_eq!(
            config.location,
            DbLocation::File(PathBuf::from("/data/rezepte.db"))
        );
        assert_eq!(config.busy_timeout, Duration::ZERO);
    }

    #[test]
    fn location_display_is_human_readable() {
        assert_eq!(StoreConfig::in_memory().location.to_string(), ":memory:");
        assert_eq!(StoreConfig::in_memory().mode_label(), "memory");
    }
}
