//! Error types for the user grid controller.
//!
//! Two families of errors live here:
//!
//! - [`UserGridError`]: infrastructure faults (configuration, session store,
//!   tracing setup). Returned through the [`Result`] alias.
//! - [`OperationError`]: the normalized outcome of a failed remote operation.
//!   These never escape as faults; every remote call site converts its failure
//!   into an `OperationError` which the controller stores in its status channel.

use thiserror::Error;

/// Message used when the server gives no usable explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Fixed message reported for authorization failures.
pub const AUTHORIZATION_FAILURE_MESSAGE: &str = "Unauthorized: Invalid or expired session.";

/// Message reported when a response body does not match the canonical envelope.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Malformed response from server";

/// Status code assumed when no HTTP status is available.
pub const DEFAULT_STATUS_CODE: u16 = 500;

/// The main error type for infrastructure operations.
///
/// # Examples
///
/// ```
/// use usergrid::domain::UserGridError;
///
/// fn validate_config() -> Result<(), UserGridError> {
///     Err(UserGridError::Config("base_url must not be empty".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum UserGridError {
    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing the persisted session failed.
    #[error("Session error: {0}")]
    Session(String),

    /// The HTTP client could not be constructed.
    #[error("Remote client error: {0}")]
    Remote(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized `Result` type for infrastructure operations.
pub type Result<T> = std::result::Result<T, UserGridError>;

/// Classification of a failed remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No response arrived (connection refused, timeout).
    Network,
    /// The request or the response payload was rejected as malformed (4xx).
    Validation,
    /// The session token was missing, invalid or expired (401).
    Authorization,
    /// The target record does not exist server-side.
    NotFound,
    /// The server failed to process the request (5xx).
    Server,
}

/// Normalized failure of a single remote operation.
///
/// Displayed to the user as the message followed by `Status Code: N`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status_code})")]
pub struct OperationError {
    /// Human-readable explanation.
    pub message: String,
    /// HTTP status code, or [`DEFAULT_STATUS_CODE`] when none was received.
    pub status_code: u16,
    /// Taxonomy bucket the failure belongs to.
    pub kind: FailureKind,
}

impl OperationError {
    /// Builds an error from an HTTP status and an optional server message.
    ///
    /// - `401` always carries [`AUTHORIZATION_FAILURE_MESSAGE`]
    /// - `404` is [`FailureKind::NotFound`]
    /// - any other 4xx is [`FailureKind::Validation`]
    /// - everything else is [`FailureKind::Server`]
    ///
    /// # Example
    ///
    /// ```
    /// use usergrid::domain::{FailureKind, OperationError};
    ///
    /// let err = OperationError::from_status(503, None);
    /// assert_eq!(err.kind, FailureKind::Server);
    /// assert_eq!(err.status_code, 503);
    /// ```
    #[must_use]
    pub fn from_status(status_code: u16, message: Option<String>) -> Self {
        let kind = match status_code {
            401 => FailureKind::Authorization,
            404 => FailureKind::NotFound,
            400..=499 => FailureKind::Validation,
            _ => FailureKind::Server,
        };

        let message = if kind == FailureKind::Authorization {
            AUTHORIZATION_FAILURE_MESSAGE.to_string()
        } else {
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
        };

        Self { message, status_code, kind }
    }

    /// A transport-level failure; no status was received so 500 is assumed.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.trim().is_empty() { GENERIC_FAILURE_MESSAGE.to_string() } else { message },
            status_code: DEFAULT_STATUS_CODE,
            kind: FailureKind::Network,
        }
    }

    /// A validation failure with an explicit status code.
    #[must_use]
    pub fn validation(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
            kind: FailureKind::Validation,
        }
    }

    /// The response body did not match the canonical envelope.
    #[must_use]
    pub fn malformed(detail: &str) -> Self {
        tracing::debug!(detail = %detail, "rejecting malformed payload");
        Self::validation(MALFORMED_RESPONSE_MESSAGE, 422)
    }

    /// The target record is absent server-side.
    #[must_use]
    pub fn not_found(message: Option<String>) -> Self {
        Self::from_status(404, message)
    }

    /// Returns `true` if the failure means the session is no longer valid.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        self.kind == FailureKind::Authorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_uses_fixed_message() {
        let err = OperationError::from_status(401, Some("token expired at 12:00".into()));
        assert_eq!(err.kind, FailureKind::Authorization);
        assert_eq!(err.message, AUTHORIZATION_FAILURE_MESSAGE);
        assert!(err.is_authorization());
    }

    #[test]
    fn status_classification() {
        assert_eq!(OperationError::from_status(404, None).kind, FailureKind::NotFound);
        assert_eq!(OperationError::from_status(422, None).kind, FailureKind::Validation);
        assert_eq!(OperationError::from_status(400, None).kind, FailureKind::Validation);
        assert_eq!(OperationError::from_status(500, None).kind, FailureKind::Server);
        assert_eq!(OperationError::from_status(302, None).kind, FailureKind::Server);
    }

    #[test]
    fn missing_message_falls_back_to_generic() {
        let err = OperationError::from_status(500, Some("   ".into()));
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);

        let err = OperationError::network("");
        assert_eq!(err.status_code, DEFAULT_STATUS_CODE);
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn server_message_is_kept() {
        let err = OperationError::from_status(409, Some("Email already taken".into()));
        assert_eq!(err.message, "Email already taken");
        assert_eq!(err.status_code, 409);
    }
}
