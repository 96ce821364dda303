//! Backend error types.

use soul_core::PaginationError;
use thiserror::Error;

/// Result type for backend operations.
pub type Result<T, E = BackendError> = std::result::Result<T, E>;

/// Failures of the local key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the store file failed.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file or a stored value is not valid JSON for its type.
    #[error("storage format error: {0}")]
    Format(#[source] serde_json::Error),
}

/// Errors reported by every [`DiaryBackend`].
///
/// [`DiaryBackend`]: crate::DiaryBackend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend does not accept new accounts.
    #[error("registration is not supported")]
    RegistrationNotSupported,

    /// The username is taken.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Unknown username or wrong password.
    #[error("incorrect credentials")]
    IncorrectCredentials,

    /// The operation needs a signed-in user.
    #[error("not authenticated")]
    NonAuthenticated,

    /// No sense with the requested id.
    #[error("sense not found")]
    SenseNotFound,

    /// The sense belongs to another account.
    #[error("access to the sense is forbidden")]
    Forbidden,

    /// A sense entry field is blank.
    #[error("invalid sense: {0}")]
    InvalidSense(&'static str),

    /// The cursor or limit was rejected.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// The server refused the request for another reason.
    #[error("server rejected the request with {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A stored or received sense payload is not a diary entry.
    #[error("malformed sense payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The HTTP request failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl BackendError {
    /// Returns true if signing in again may fix the error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::NonAuthenticated | Self::IncorrectCredentials)
    }
}
