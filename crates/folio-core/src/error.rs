//! Error types for Folio core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.

use thiserror::Error;

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Core error type for Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Imported text is not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Valid JSON that lacks required envelope or document fields
    #[error("Schema error: {0}")]
    Schema(String),

    /// Attempted to delete the only block of a document
    #[error("Cannot delete the last content block")]
    LastBlock,

    /// Supplied secret did not match
    #[error("Incorrect password")]
    Auth,

    /// A gated command ran without a valid session
    #[error("Authentication required")]
    AuthRequired,

    /// Store backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FolioError {
    /// Whether the error leaves persisted state untouched and can be shown inline.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FolioError::LastBlock | FolioError::Auth | FolioError::AuthRequired
        )
    }
}

impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for FolioError {
    fn from(err: rusqlite::Error) -> Self {
        FolioError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            FolioError::Parse(err.to_string())
        } else {
            FolioError::Schema(err.to_string())
        }
    }
}
