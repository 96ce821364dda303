#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for pagination operations.
pub const TRACING_TARGET_PAGINATION: &str = "soul_core::pagination";

pub mod pagination;

pub use pagination::{
    Cursor, CursorPage, DEFAULT_LIMIT, Keyed, PageRequest, Paginator, PaginationError,
    PaginationResult, RecordSource, SnapshotSource,
};
