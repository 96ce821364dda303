use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::TRACING_TARGET_MIDDLEWARE;
use crate::handler::ErrorKind;

type Panic = Box<dyn Any + Send + 'static>;

/// Logs the panic payload and responds with 500.
pub fn catch_panic(err: Panic) -> Response {
    let message = if let Some(panic) = err.downcast_ref::<String>() {
        panic.as_str()
    } else if let Some(panic) = err.downcast_ref::<&str>() {
        panic
    } else {
        "unknown panic type"
    };

    tracing::error!(
        target: TRACING_TARGET_MIDDLEWARE,
        panic = message,
        "service panic"
    );

    ErrorKind::InternalServerError.into_response()
}
