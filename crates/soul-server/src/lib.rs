#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for bearer token verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "soul_server::authentication";

/// Tracing target for request extraction failures.
pub const TRACING_TARGET_EXTRACT: &str = "soul_server::extract";

/// Tracing target for middleware failures.
pub const TRACING_TARGET_MIDDLEWARE: &str = "soul_server::middleware";
