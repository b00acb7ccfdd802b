//! Error types for b2-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for b2-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// A structured error body returned by the service for any non-200 response
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[error("Status: {status}, Code: {code}, Message: {message}")]
pub struct ApiError {
    /// HTTP status echoed by the service
    pub status: u16,
    /// Machine-readable error code, e.g. "bad_request"
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl ApiError {
    /// Build the error for a non-200 response body
    ///
    /// Bodies that are not a well-formed error object are kept verbatim as the
    /// message, with the HTTP status and an "unknown" code.
    pub fn from_body(http_status: u16, body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self {
            status: http_status,
            code: "unknown".to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
        })
    }
}

/// Error types for b2-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Connection or transport failure, never retried by the library
    #[error("Network error: {0}")]
    Transport(String),

    /// Well-formed error response from the service
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client-side precondition failure, raised before any request is sent
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Downloaded content does not match what the service declared
    #[error("Integrity check failed: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    /// Malformed JSON in an otherwise successful response
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Account not found in configuration
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// No bucket with the given name in the account
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) | Error::InvalidPath(_) | Error::Config(_) => 2, // UsageError
            Error::Transport(_) => 3,                                              // NetworkError
            Error::Api(api) => match api.status {
                401 | 403 => 4, // AuthError
                404 => 5,       // NotFound
                409 => 6,       // Conflict
                _ => 1,
            },
            Error::AccountNotFound(_) | Error::BucketNotFound(_) => 5, // NotFound
            Error::Integrity { .. } => 8,                              // IntegrityError
            _ => 1,                                                    // GeneralError
        }
    }

    /// The service error, if this is one
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: &str) -> Error {
        Error::Api(ApiError {
            status,
            code: code.into(),
            message: "m".into(),
        })
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Validation("test".into()).exit_code(), 2);
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Transport("test".into()).exit_code(), 3);
        assert_eq!(api(401, "unauthorized").exit_code(), 4);
        assert_eq!(api(403, "forbidden").exit_code(), 4);
        assert_eq!(api(404, "not_found").exit_code(), 5);
        assert_eq!(api(409, "conflict").exit_code(), 6);
        assert_eq!(api(400, "bad_request").exit_code(), 1);
        assert_eq!(Error::AccountNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::BucketNotFound("test".into()).exit_code(), 5);
        let integrity = Error::Integrity {
            expected: "a".into(),
            actual: "b".into(),
        };
        assert_eq!(integrity.exit_code(), 8);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            status: 400,
            code: "nope".into(),
            message: "nope nope".into(),
        };
        assert_eq!(err.to_string(), "Status: 400, Code: nope, Message: nope nope");
        assert_eq!(
            Error::from(err).to_string(),
            "Status: 400, Code: nope, Message: nope nope"
        );
    }

    #[test]
    fn test_api_error_from_body() {
        let err = ApiError::from_body(
            401,
            br#"{"status":401,"code":"bad_auth_token","message":"expired"}"#,
        );
        assert_eq!(err.status, 401);
        assert_eq!(err.code, "bad_auth_token");
        assert_eq!(err.message, "expired");
    }

    #[test]
    fn test_api_error_from_unparseable_body() {
        let err = ApiError::from_body(502, b"<html>Bad Gateway</html>\n");
        assert_eq!(err.status, 502);
        assert_eq!(err.code, "unknown");
        assert_eq!(err.message, "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_error_display() {
        let err = Error::AccountNotFound("work".into());
        assert_eq!(err.to_string(), "Account not found: work");

        let err = Error::Validation("no file id provided".into());
        assert_eq!(err.to_string(), "Invalid request: no file id provided");
    }
}
