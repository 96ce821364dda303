//! All [`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,no_run
//! use soul_server::handler::routes;
//! use soul_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use soul_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::builder().build()?;
//! let state = ServiceState::from_config(&config).await?;
//!
//! let router: axum::Router = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod request;
mod response;
mod senses;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{Credentials, CursorPagination, MAX_LIMIT, SenseData};
pub use crate::handler::response::{
    ErrorResponse, ServerOptions, Sense, SensesPage, SessionToken,
};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with every route of the API.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(authentication::routes())
        .merge(senses::routes())
        .fallback(fallback)
}
