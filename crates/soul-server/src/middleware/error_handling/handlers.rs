use std::future::ready;

use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};
use tower::timeout::error::Elapsed;

use crate::TRACING_TARGET_MIDDLEWARE;
use crate::handler::{Error, ErrorKind};

type ResponseFut = BoxFuture<'static, Response>;

/// Transforms a [`tower::BoxError`] into an [`Error`] response.
///
/// Timeouts are recognized; anything else is reported as an unexpected
/// internal error.
pub fn handle_error(err: tower::BoxError) -> ResponseFut {
    let error = if err.is::<Elapsed>() {
        tracing::error!(
            target: TRACING_TARGET_MIDDLEWARE,
            error = %err,
            "request timeout exceeded"
        );

        Error::new(ErrorKind::InternalServerError)
            .with_message("Request timeout")
            .with_context("The request took too long to process and was terminated")
    } else {
        tracing::error!(
            target: TRACING_TARGET_MIDDLEWARE,
            error = %err,
            "unknown middleware error"
        );

        Error::new(ErrorKind::InternalServerError)
            .with_message("An unexpected error occurred")
            .with_context(err.to_string())
    };

    ready(error.into_response()).boxed()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn timeout_is_internal_error() {
        let response = handle_error(Box::new(Elapsed::new())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_error_is_internal_error() {
        let err: tower::BoxError = "boom".into();
        let response = handle_error(err).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
