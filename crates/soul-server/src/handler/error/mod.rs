//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod pagination_error;
mod pg_error;

pub use http_error::{Error, ErrorKind, Result};
