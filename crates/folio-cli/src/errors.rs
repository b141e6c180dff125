//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes so scripts can tell a missing
//! project from a rejected secret.

use std::fmt;

use folio_core::FolioError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (category, project, import file)
    NotFound { message: String, hint: String },

    /// Wrong secret or missing session
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for a core error.
pub fn folio_exit_code(err: &FolioError) -> i32 {
    match err {
        FolioError::NotFound(_) => exit_codes::NOT_FOUND,
        FolioError::Parse(_)
        | FolioError::Schema(_)
        | FolioError::LastBlock
        | FolioError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        FolioError::Auth | FolioError::AuthRequired => exit_codes::AUTH_FAILED,
        FolioError::Storage(_) => 1,
    }
}

/// Exit code for any error reaching `main`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    if let Some(core) = err.downcast_ref::<FolioError>() {
        return folio_exit_code(core);
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_hint() {
        let err = CliError::not_found("Project not found", "Hint: Run `folio project list`.");
        assert_eq!(
            err.to_string(),
            "Project not found\nHint: Run `folio project list`."
        );
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let err: anyhow::Error = FolioError::AuthRequired.into();
        assert_eq!(exit_code(&err), exit_codes::AUTH_FAILED);

        let err: anyhow::Error = FolioError::Schema("missing metadata".into()).into();
        assert_eq!(exit_code(&err), exit_codes::INVALID_INPUT);

        let err: anyhow::Error = FolioError::NotFound("Category \"x\"".into()).into();
        assert_eq!(exit_code(&err), exit_codes::NOT_FOUND);

        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_cli_error_survives_anyhow() {
        let err: anyhow::Error = CliError::invalid_input("bad index").into();
        assert_eq!(exit_code(&err), exit_codes::INVALID_INPUT);
    }
}
