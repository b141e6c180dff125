//! Shared CLI constants.

/// Process exit codes beyond the generic failure (1).
pub mod exit_codes {
    /// Category, project or file not found
    pub const NOT_FOUND: i32 = 3;
    /// Bad arguments or an unreadable import
    pub const INVALID_INPUT: i32 = 4;
    /// Wrong secret or no valid session
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variable holding the secret for non-interactive login.
pub const SECRET_ENV: &str = "FOLIO_SECRET";

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "folio.db";
