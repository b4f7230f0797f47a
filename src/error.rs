//! Error types for SmartGrant
//!
//! This module defines all error types used throughout the library,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SmartGrant operations
///
/// This enum encompasses all recoverable errors that can occur during
/// grant selection, settings handling, and authorization flow execution.
///
/// A cancelled authorization attempt is deliberately NOT represented here:
/// cancellation resolves the attempt callback with neither parameters nor
/// an error. Calling `authorize` while a previous attempt is still pending
/// is a caller contract violation and panics instead of returning a value.
#[derive(Error, Debug)]
pub enum SmartGrantError {
    /// Configuration-related errors (missing protocol engine, malformed
    /// endpoint settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server's conformance security description advertises no
    /// supported authorization method
    #[error("Unsupported server: {0}")]
    UnsupportedServer(String),

    /// Opaque failure reported by the OAuth2 protocol engine, passed
    /// through verbatim
    #[error("Authorization protocol error: {0}")]
    Protocol(String),

    /// The presentation mechanism could not display the authorization UI
    /// (browser failed to open, embedded view unavailable)
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for SmartGrant operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = SmartGrantError::Configuration("no engine".to_string());
        assert_eq!(error.to_string(), "Configuration error: no engine");
    }

    #[test]
    fn test_unsupported_server_error_display() {
        let error = SmartGrantError::UnsupportedServer("no authorize endpoint".to_string());
        assert_eq!(
            error.to_string(),
            "Unsupported server: no authorize endpoint"
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let error = SmartGrantError::Protocol("invalid_grant".to_string());
        assert_eq!(
            error.to_string(),
            "Authorization protocol error: invalid_grant"
        );
    }

    #[test]
    fn test_presentation_error_display() {
        let error = SmartGrantError::Presentation("browser failed to open".to_string());
        assert_eq!(
            error.to_string(),
            "Presentation error: browser failed to open"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SmartGrantError = io_error.into();
        assert!(matches!(error, SmartGrantError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: SmartGrantError = json_error.into();
        assert!(matches!(error, SmartGrantError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: SmartGrantError = yaml_error.into();
        assert!(matches!(error, SmartGrantError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmartGrantError>();
    }
}
