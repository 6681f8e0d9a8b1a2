//! Error types for bloodbank.
//!
//! This module defines all error types used throughout the bloodbank crate.
//! Every variant renders as a message suitable for showing to the person at
//! the terminal.

use std::path::PathBuf;
use thiserror::Error;

use crate::blood_group::BloodGroup;

/// The main error type for bloodbank operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A required field is missing or a number is outside its allowed range.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// Text that is not one of the eight recognised blood groups.
    #[error(transparent)]
    InvalidBloodGroup(#[from] crate::blood_group::ParseBloodGroupError),

    // === Supply Errors ===
    /// Not enough units of the group are on hand to accept a request.
    #[error("not enough {group} blood available: requested {requested} units, {available} on hand")]
    InsufficientSupply {
        /// The requested blood group.
        group: BloodGroup,
        /// Units asked for.
        requested: u32,
        /// Units on hand when the request was checked.
        available: u64,
    },

    /// Supply fell below a pending request's size after it was accepted.
    #[error(
        "{group} supply changed since the request was accepted: \
         {requested} units needed, only {available} left"
    )]
    StaleSupply {
        /// The requested blood group.
        group: BloodGroup,
        /// Units the request still needs.
        requested: u32,
        /// Units on hand at fulfillment time.
        available: u64,
    },

    /// Attempted to take more units from a donor than they have.
    #[error("donor {id} has {available} units, cannot take {requested}")]
    DonorOverdraw {
        /// Donor id.
        id: i64,
        /// Units asked for.
        requested: u32,
        /// Units the donor actually has.
        available: u32,
    },

    // === Lookup Errors ===
    /// No pending request has the given id.
    #[error("no pending request with id {id}")]
    RequestNotFound {
        /// The missing request id.
        id: i64,
    },

    /// No donor has the given id.
    #[error("no donor with id {id}")]
    DonorNotFound {
        /// The missing donor id.
        id: i64,
    },

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
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for bloodbank operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the named field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the underlying store.
    ///
    /// Persistence failures abort the current action only; the store handle
    /// remains usable for the next one.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DirectoryCreate { .. }
        )
    }

    /// Check if this error is a failed lookup.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RequestNotFound { .. } | Self::DonorNotFound { .. }
        )
    }

    /// Check if this error reports a supply shortfall.
    #[must_use]
    pub fn is_supply_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientSupply { .. } | Self::StaleSupply { .. } | Self::DonorOverdraw { .. }
        )
    }

    /// Check if this error was caused by bad user input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidBloodGroup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("name", "must not be empty");
        assert_eq!(err.to_string(), "invalid name: must not be empty");
        assert!(err.is_validation_error());
        assert!(!err.is_persistence_error());
    }

    #[test]
    fn test_insufficient_supply_display() {
        let err = Error::InsufficientSupply {
            group: BloodGroup::AbNeg,
            requested: 3,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("AB-"));
        assert!(msg.contains("requested 3"));
        assert!(msg.contains("1 on hand"));
        assert!(err.is_supply_error());
    }

    #[test]
    fn test_stale_supply_display() {
        let err = Error::StaleSupply {
            group: BloodGroup::OPos,
            requested: 4,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("O+"));
        assert!(msg.contains("only 2 left"));
        assert!(err.is_supply_error());
    }

    #[test]
    fn test_not_found_errors() {
        let err = Error::RequestNotFound { id: 7 };
        assert_eq!(err.to_string(), "no pending request with id 7");
        assert!(err.is_not_found());

        let err = Error::DonorNotFound { id: 3 };
        assert_eq!(err.to_string(), "no donor with id 3");
        assert!(err.is_not_found());
        assert!(!err.is_supply_error());
    }

    #[test]
    fn test_donor_overdraw_display() {
        let err = Error::DonorOverdraw {
            id: 2,
            requested: 5,
            available: 3,
        };
        assert_eq!(err.to_string(), "donor 2 has 3 units, cannot take 5");
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::DatabaseQuery(_)));
        assert!(err.is_persistence_error());
    }

    #[test]
    fn test_from_parse_blood_group_error() {
        let parse_err = "Z+".parse::<BloodGroup>().unwrap_err();
        let err: Error = parse_err.into();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("Z+"));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
        assert!(err.is_persistence_error());
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "min_donor_age too large".to_string(),
        };
        assert!(err.to_string().contains("min_donor_age"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
        assert!(err.is_persistence_error());
    }
}
