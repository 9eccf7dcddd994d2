//! Error handling module for the tact CLI.
//!
//! This module provides custom error types using `thiserror` for structured
//! error handling throughout the application.

use thiserror::Error;

/// Main error type for the tact CLI application.
#[derive(Error, Debug)]
pub enum TactError {
    /// Error when a required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when reading the source file fails.
    #[error("Could not read {path}: {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error when writing a requested artifact fails.
    #[error("Could not write {path}: {source}")]
    WriteArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A compilation phase failed. The message already carries the
    /// "Línea N:" / "Error de ejecución:" prefix spec.md §7 requires.
    #[error("{0}")]
    Compile(#[from] tacc_drv::CompileError),

    /// Error when IO operations outside of source/artifact handling fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using TactError.
pub type Result<T> = std::result::Result<T, TactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = TactError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn compile_error_is_transparent() {
        let inner = tacc_drv::Session::new(tacc_drv::Config::new("y = undefined + 1\n"))
            .compile()
            .unwrap_err();
        let expected = inner.to_string();
        let err: TactError = inner.into();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let tact_err: TactError = io_err.into();
        assert!(matches!(tact_err, TactError::Io(_)));
    }
}
