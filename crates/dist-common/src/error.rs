//! Error types for dist
//!
//! This module defines the common error types used throughout the system.

use crate::types::IdError;
use thiserror::Error;

/// Common result type for dist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when a destructive or committing command lacks `--really-do-it`
pub const CONFIRMATION_MESSAGE: &str =
    "--really-do-it must be specified for this action to have an effect; you have been warned";

/// Common error type for dist
#[derive(Debug, Error)]
pub enum Error {
    // Organization errors
    #[error("already exist org {0}, if want to update, please add --force")]
    OrgAlreadyExists(String),

    #[error("{0} does not belong to any organization, please add user sp first")]
    SpNotInAnyOrg(String),

    // Dataset errors
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("already exist dataset {0}, if want to update, please add --force")]
    DatasetAlreadyExists(String),

    #[error("already exist piece {cid}, if want to update, please add --force")]
    PieceAlreadyExists { dataset: String, cid: String },

    // Allocation errors
    #[error("allocation plan is stale: expected piece {expected} at index {index}")]
    StalePlan { index: usize, expected: String },

    // Operator errors
    #[error("{}", CONFIRMATION_MESSAGE)]
    ConfirmationRequired,

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if this is a not found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DatasetNotFound(_) | Self::SpNotInAnyOrg(_)
        )
    }

    /// Check if this is an already-exists error
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::OrgAlreadyExists(_)
                | Self::DatasetAlreadyExists(_)
                | Self::PieceAlreadyExists { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_not_found() {
        assert!(Error::DatasetNotFound("D".into()).is_not_found());
        assert!(Error::SpNotInAnyOrg("f09".into()).is_not_found());
        assert!(!Error::ConfirmationRequired.is_not_found());
    }

    #[test]
    fn test_error_already_exists() {
        assert!(Error::DatasetAlreadyExists("D".into()).is_already_exists());
        assert!(!Error::DatasetNotFound("D".into()).is_already_exists());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::SpNotInAnyOrg("f09".into()).to_string(),
            "f09 does not belong to any organization, please add user sp first"
        );
        assert_eq!(Error::ConfirmationRequired.to_string(), CONFIRMATION_MESSAGE);
    }
}
