//! CLI-specific error types and mappings.
//!
//! Maps core errors to exit codes and user-facing messages.

use thiserror::Error;
use vidpace_core::CoreError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CliError {
    /// Map error to a sysexits-style exit code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Database(_) => 73, // EX_CANTCREAT
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Store(store_err) => Self::Database(store_err.to_string()),
            CoreError::Settings(settings_err) => Self::Config(settings_err.to_string()),
            CoreError::Session(session_err) => Self::Core(session_err.to_string()),
            CoreError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpace_core::{SettingsError, StoreError};

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let store: CliError = CoreError::Store(StoreError::Unavailable("gone".into())).into();
        assert_eq!(store.exit_code(), 73);

        let settings: CliError = CoreError::Settings(SettingsError::InvalidSaveDebounce(1)).into();
        assert_eq!(settings.exit_code(), 78);

        let validation: CliError = CoreError::Validation("bad".into()).into();
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.to_string(), "Invalid arguments: bad");
    }
}
