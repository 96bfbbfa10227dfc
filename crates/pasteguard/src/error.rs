//! Error types for pasteguard.
//!
//! The interception path itself never fails outward; these errors come from
//! the rule store and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pasteguard operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the rule database.
    #[error("failed to open rule database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A rule was rejected by the store.
    #[error("invalid rule: {reason}")]
    InvalidRule {
        /// Why the rule was rejected.
        reason: String,
    },

    /// The rule store is unavailable.
    #[error("rule store unavailable: {0}")]
    RuleStoreUnavailable(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// The guard has shut down.
    #[error("guard is not running")]
    GuardStopped,
}

/// A specialized Result type for pasteguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid rule error.
    #[must_use]
    pub fn invalid_rule(reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            reason: reason.into(),
        }
    }

    /// Create a rule store unavailable error.
    #[must_use]
    pub fn rule_store_unavailable(message: impl Into<String>) -> Self {
        Self::RuleStoreUnavailable(message.into())
    }

    /// Check if this error indicates the guard has stopped.
    #[must_use]
    pub fn is_guard_stopped(&self) -> bool {
        matches!(self, Self::GuardStopped)
    }
}
