//! Request extractors.
//!
//! - [`AuthHeader`] and [`AuthState`] authenticate bearer tokens.
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] replace the axum
//!   extractors of the same name and reject with JSON error bodies.

mod auth;
mod reject;

pub use crate::extract::auth::{AuthHeader, AuthState};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
