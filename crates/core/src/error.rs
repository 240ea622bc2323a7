//! Error types for Stitch.
//!
//! A single error enum covers configuration, I/O, prompt parsing, identifier
//! and lookup failures. Recoverable expansion anomalies are not errors; they
//! are reported as warnings by the resolver.

use thiserror::Error;

/// Unified error type for Stitch.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed prompt files or front matter
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Identifier could not be generated or parsed
    #[error("Invalid prompt id: {0}")]
    InvalidId(String),

    /// Requested prompt does not exist
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// The prompt lookup backing the resolver failed
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("/p1/missing".to_string());
        assert_eq!(err.to_string(), "Prompt not found: /p1/missing");

        let err = AppError::InvalidId("no-separator".to_string());
        assert_eq!(err.to_string(), "Invalid prompt id: no-separator");
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("key: [unclosed").unwrap_err();
        let err: AppError = yaml_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
