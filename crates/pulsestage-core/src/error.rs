//! Unified application error types for PulseStage.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP layer turns the
//! [`ErrorKind`] into a status code and the optional machine `code` into
//! the response body.

use std::fmt;
use thiserror::Error;

/// Machine-readable reason codes carried in [`AppError::code`].
pub mod codes {
    /// No identity was presented with the request.
    pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
    /// The caller has no membership in the target team.
    pub const NOT_A_MEMBER: &str = "NOT_A_MEMBER";
    /// The caller's role in the target team is too low.
    pub const INSUFFICIENT_ROLE: &str = "INSUFFICIENT_ROLE";
    /// The change would leave a team without an owner.
    pub const LAST_OWNER_PROTECTED: &str = "LAST_OWNER_PROTECTED";
    /// The target belongs to another tenant.
    pub const CROSS_TENANT: &str = "CROSS_TENANT";
    /// A role string did not name a known role.
    pub const INVALID_ROLE: &str = "INVALID_ROLE";
    /// The question is frozen.
    pub const QUESTION_FROZEN: &str = "QUESTION_FROZEN";
    /// The double-submit CSRF token was missing or wrong.
    pub const CSRF_MISMATCH: &str = "CSRF_MISMATCH";
    /// No tenant could be resolved for the request.
    pub const TENANT_UNRESOLVED: &str = "TENANT_UNRESOLVED";
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found (or lives in another tenant).
    NotFound,
    /// No authenticated identity is present or the credential is invalid.
    Authentication,
    /// The caller is authenticated but not allowed to perform the action.
    Authorization,
    /// Input validation failed, or an absolute invariant would be violated.
    Validation,
    /// A conflict occurred (duplicate entry, frozen question, etc.).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration or wiring error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout PulseStage.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional machine-readable reason code (e.g. `"LAST_OWNER_PROTECTED"`).
    pub code: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a machine-readable reason code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns whether this error denies access rather than reporting a fault.
    pub fn is_denial(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Authentication | ErrorKind::Authorization | ErrorKind::NotFound
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            code: self.code,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_survives_clone() {
        let err = AppError::validation("last owner").with_code(codes::LAST_OWNER_PROTECTED);
        let cloned = err.clone();
        assert_eq!(cloned.code, Some(codes::LAST_OWNER_PROTECTED));
        assert_eq!(cloned.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found("question missing");
        assert_eq!(err.to_string(), "NOT_FOUND: question missing");
    }
}
