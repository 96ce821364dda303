#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for backend operations.
pub const TRACING_TARGET_BACKEND: &str = "soul_client::backend";

/// Tracing target for the local key/value store.
pub const TRACING_TARGET_STORAGE: &str = "soul_client::storage";

mod backend;
mod error;
pub mod model;
mod storage;

pub use crate::backend::{
    BackendConfig, BackendKind, DiaryBackend, LocalBackend, SoulBackend, SoulConfig, connect,
};
pub use crate::error::{BackendError, Result, StorageError};
pub use crate::model::{Emotion, Options, Sense, SenseEntry, SenseList, SenseRecord};
pub use crate::storage::KeyValueStore;
