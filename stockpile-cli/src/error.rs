//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use std::fmt;
use stockpile::{Error as LibError, ErrorKind};

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Data directory not found (and auto-init disabled).
    NoDataDirectory,

    /// Configuration error.
    Config(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Semantic failure (not found, not reserved, conflict, insufficient stock)
    /// - 3: No data directory found
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => match lib_err.kind() {
                ErrorKind::NotFound
                | ErrorKind::NotReserved
                | ErrorKind::ReservationConflict
                | ErrorKind::InsufficientQuantity
                | ErrorKind::AlreadyExists => 1,
                ErrorKind::Validation => 4,
                ErrorKind::Io => 5,
                ErrorKind::Configuration => 7,
                ErrorKind::Store | ErrorKind::ShuttingDown => 6,
            },
            CliError::NoDataDirectory => 3,
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::NoDataDirectory => {
                write!(
                    f,
                    "Data directory not found (run `stockpile init` or enable auto-init)"
                )
            }
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<stockpile::ValidationError> for CliError {
    fn from(e: stockpile::ValidationError) -> Self {
        CliError::InvalidArguments(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_failures_exit_1() {
        let err = CliError::from(LibError::NotReserved {
            item_id: "X".into(),
        });
        assert_eq!(err.exit_code(), 1);

        let err = CliError::from(LibError::InsufficientQuantity {
            item_id: "X".into(),
            requested: 5,
            available: 1,
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_library_kinds_map_to_exit_codes() {
        let validation = CliError::from(LibError::Validation {
            field: "quantity".into(),
            message: "must be greater than 0".into(),
        });
        assert_eq!(validation.exit_code(), 4);
        assert_eq!(CliError::from(LibError::store("locked")).exit_code(), 6);
        assert_eq!(CliError::from(LibError::ShuttingDown).exit_code(), 6);
    }

    #[test]
    fn test_cli_variants() {
        assert_eq!(CliError::NoDataDirectory.exit_code(), 3);
        assert_eq!(CliError::InvalidArguments("x".into()).exit_code(), 4);
        assert_eq!(CliError::Config("x".into()).exit_code(), 7);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(CliError::from(io).exit_code(), 5);
    }
}
