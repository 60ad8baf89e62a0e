//! Error types for preppy.
//!
//! This module defines all error types used throughout the preppy crate,
//! separating missing preconditions, storage failures and validation
//! failures so callers can present each one appropriately.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for preppy operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
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

    // === Household / Checklist Errors ===
    /// The household profile is absent or has no home state.
    #[error("missing household configuration for user {user_id}: save family info with a home state first")]
    MissingHousehold {
        /// The user whose profile is incomplete.
        user_id: i64,
    },

    /// Submitted data failed validation. Every violation found is listed.
    #[error("validation failed: {}", .violations.join("; "))]
    Validation {
        /// All violations, in the order they were detected.
        violations: Vec<String>,
    },

    /// A kit type string did not name a known kit.
    #[error("unknown kit type '{0}' (expected go-bag, shelter or task)")]
    UnknownKitType(String),

    // === Catalog Errors ===
    /// A catalog file could not be read or contained bad data.
    #[error("failed to load catalog file {path}: {message}")]
    CatalogLoad {
        /// The offending file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for preppy operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a validation error from a single violation.
    #[must_use]
    pub fn invalid(violation: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![violation.into()],
        }
    }

    /// Turn accumulated violations into a result.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `violations` is not empty.
    pub fn check(violations: Vec<String>) -> Result<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation { violations })
        }
    }

    /// Create a catalog load error for the given file.
    #[must_use]
    pub fn catalog_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CatalogLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a missing household precondition.
    #[must_use]
    pub fn is_missing_household(&self) -> bool {
        matches!(self, Self::MissingHousehold { .. })
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error came from the storage layer.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. } | Self::DatabaseQuery(_) | Self::DatabaseMigration { .. }
        )
    }
}
