//! Pagination input error to HTTP error conversion.

use soul_core::PaginationError;

use crate::handler::{Error, ErrorKind};

impl From<PaginationError> for Error<'static> {
    fn from(error: PaginationError) -> Self {
        tracing::debug!(
            target: crate::TRACING_TARGET_EXTRACT,
            error = %error,
            "pagination input rejected"
        );

        let kind = match error {
            PaginationError::InvalidCursor(_) => ErrorKind::InvalidCursor,
            PaginationError::InvalidLimit(_) => ErrorKind::InvalidLimit,
        };

        kind.with_resource("pagination")
            .with_context(error.to_string())
    }
}
