//! Error types shared across the admin core.
//!
//! Each concern gets its own enum, so callers can match on exactly the failure
//! they care about:
//!
//! - [`RequestError`]: a non-2xx response or a transport failure on any REST call.
//! - [`AuthError`]: bad credentials, a login reply without a token, or a stale session.
//! - [`ValidationError`]: a form problem caught before any request is sent.
//! - [`ConfigError`]: configuration could not be loaded.

use thiserror::Error;

/// A failed call against the REST API.
///
/// `message` is the server-supplied reason when the response carried one
/// (`{"message": ...}` or `{"error": ...}`), otherwise a generic description.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct RequestError {
    /// HTTP status, absent for network-level failures.
    pub status: Option<u16>,
    pub message: String,
    /// True when `message` came from the response body.
    pub server_supplied: bool,
}

impl RequestError {
    /// The request never produced an HTTP response.
    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: format!("network error: {detail}"),
            server_supplied: false,
        }
    }

    /// The server answered with a non-2xx status.
    pub fn status(status: u16, server_message: Option<String>) -> Self {
        match server_message {
            Some(message) => Self {
                status: Some(status),
                message,
                server_supplied: true,
            },
            None => Self {
                status: Some(status),
                message: format!("request failed with status {status}"),
                server_supplied: false,
            },
        }
    }

    /// A 2xx response whose body could not be understood.
    pub fn malformed(status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            status: Some(status),
            message: format!("malformed response body: {detail}"),
            server_supplied: false,
        }
    }

    /// The server's own explanation, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        self.server_supplied.then_some(self.message.as_str())
    }

    /// 401 or 403.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

/// Errors that can occur while establishing or validating an admin session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// The server refused the credentials (or could not be reached).
    #[error("{reason}")]
    Rejected { reason: String },

    /// The login reply had no token. Never treated as a success.
    #[error("Login failed")]
    MissingToken,

    /// The persisted token no longer identifies an admin.
    #[error("Session is no longer valid")]
    InvalidSession,
}

impl AuthError {
    pub const FALLBACK_REASON: &'static str = "Login failed";

    /// Server reason when present, generic fallback otherwise.
    pub fn rejected(err: &RequestError) -> Self {
        AuthError::Rejected {
            reason: err
                .server_message()
                .unwrap_or(Self::FALLBACK_REASON)
                .to_string(),
        }
    }
}

/// Client-side form problems.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("{field} must be a number")]
    NotANumber { field: String },

    #[error("{value:?} is not a valid {field}")]
    InvalidChoice { field: String, value: String },

    /// The operation does not apply to this kind of section.
    #[error("{0}")]
    Unsupported(String),
}

/// Configuration could not be assembled from defaults, file and environment.
#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] pub Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError(Box::new(err))
    }
}
