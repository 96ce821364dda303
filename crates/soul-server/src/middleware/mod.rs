//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Error handling: timeouts, panics and tower errors become JSON errors.
//! - Observability: request ids, request tracing, header redaction.
//! - OpenAPI: the generated document and the Scalar UI.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use axum::Router;
//! use soul_server::middleware::RouterExt;
//!
//! let app: Router = Router::new()
//!     .with_error_handling_layer(Duration::from_secs(30))
//!     .with_observability_layer();
//! ```

mod error_handling;
mod extensions;
mod observability;
mod open_api;

pub use extensions::RouterExt;
pub use open_api::{OpenApiConfig, RouterOpenApiExt};
