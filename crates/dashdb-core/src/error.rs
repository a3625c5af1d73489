//! Error types for DashDB core operations.
//!
//! Every failure is surfaced synchronously to the caller of the operation
//! that triggered it. The core never retries; the CLI layer maps these to
//! user-facing messages.

use thiserror::Error;

/// Result type alias for DashDB operations.
pub type Result<T> = std::result::Result<T, DashError>;

/// Core error type for DashDB operations.
#[derive(Debug, Error)]
pub enum DashError {
    /// Backing file could not be created, read, or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A stored line (or supplied record) is not a usable JSON object
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid collection name or reserved-field configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// In-process state is unusable (poisoned lock, missing entropy source)
    #[error("State error: {0}")]
    State(String),
}

impl From<std::io::Error> for DashError {
    fn from(err: std::io::Error) -> Self {
        DashError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_persistence() {
        let err: DashError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, DashError::Persistence(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DashError = parse.into();
        assert!(matches!(err, DashError::Serialization(_)));
    }
}
