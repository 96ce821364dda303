//! Pagination error types.

use thiserror::Error;

/// Result type for pagination input validation.
pub type PaginationResult<T, E = PaginationError> = std::result::Result<T, E>;

/// Errors raised while validating pagination input.
///
/// Both variants are produced before any record source is touched, so callers
/// can surface them as client input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The cursor token could not be decoded.
    #[error("invalid cursor: {0}")]
    InvalidCursor(&'static str),

    /// The requested page size is not a positive integer.
    #[error("invalid limit: {0}, must be a positive integer")]
    InvalidLimit(i64),
}

impl PaginationError {
    /// Returns true if the error was caused by a malformed cursor.
    #[inline]
    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, Self::InvalidCursor(_))
    }

    /// Returns true if the error was caused by a non-positive limit.
    #[inline]
    pub fn is_invalid_limit(&self) -> bool {
        matches!(self, Self::InvalidLimit(_))
    }
}
