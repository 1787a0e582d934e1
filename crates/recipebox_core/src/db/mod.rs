//! SQLite storage bootstrap for the recipe store.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Create the recipe schema on first use.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Recipe data must not be read or written before the schema check passes.
//!
//! # See also
//! - docs/architecture/data-model.md

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
mod text;

pub use open::{open_db, open_db_in_memory, open_with_config};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable diagnostic code for log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(failure, _)) => match failure.code {
                ErrorCode::CannotOpen => "db_cannot_open",
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => "db_busy",
                ErrorCode::ConstraintViolation => "db_constraint",
                ErrorCode::NotADatabase => "db_not_a_database",
                ErrorCode::ReadOnly => "db_read_only",
                _ => "db_sqlite_failure",
            },
            Self::Sqlite(_) => "db_sqlite_error",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
