//! The single error shape returned by the API client and every store.
//!
//! Network failures, HTTP status failures and `success: false` envelopes are
//! all normalised into [`ApiError`] so callers only ever match on one type.
//! The `Display` output is the human-readable message and nothing else.

use super::ports::StorageError;

/// Failure category carried by an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ApiErrorKind {
    /// No response was received, including timeouts.
    Network,
    /// The server answered 401; the session has been invalidated.
    Unauthorized,
    /// The server answered 403.
    Forbidden,
    /// The server answered 404.
    NotFound,
    /// The server answered 500.
    Server,
    /// Any other non-2xx status.
    Status,
    /// A 2xx response whose envelope reported `success: false`.
    Rejected,
    /// The envelope payload did not match the endpoint's expected shape.
    Decode,
    /// Durable session storage failed.
    Storage,
    /// The request could not be built on the client.
    InvalidRequest,
}

/// Normalised failure with a message suitable for showing to the user.
///
/// # Examples
///
/// ```
/// use enrollment_client::domain::{ApiError, ApiErrorKind};
///
/// let err = ApiError::rejected("class is full");
/// assert_eq!(err.kind(), ApiErrorKind::Rejected);
/// assert_eq!(err.to_string(), "class is full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    message: String,
}

impl ApiError {
    /// Create an error of `kind` without an HTTP status.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    fn with_status(kind: ApiErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether the failure invalidated the session.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// Convenience constructor for [`ApiErrorKind::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(ApiErrorKind::Unauthorized, 401, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(ApiErrorKind::Forbidden, 403, message)
    }

    /// Convenience constructor for [`ApiErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(ApiErrorKind::NotFound, 404, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Server`].
    pub fn server(message: impl Into<String>) -> Self {
        Self::with_status(ApiErrorKind::Server, 500, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Status`].
    pub fn status_code(status: u16, message: impl Into<String>) -> Self {
        Self::with_status(ApiErrorKind::Status, status, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Rejected, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// Convenience constructor for [`ApiErrorKind::Storage`].
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Storage, message)
    }

    /// Convenience constructor for [`ApiErrorKind::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }
}

impl From<StorageError> for ApiError {
    fn from(value: StorageError) -> Self {
        Self::storage(value.to_string())
    }
}
