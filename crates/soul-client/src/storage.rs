//! File-backed key/value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::TRACING_TARGET_STORAGE;
use crate::error::StorageError;

type StorageResult<T> = std::result::Result<T, StorageError>;

/// JSON values keyed by string, persisted to a single file.
///
/// Every write rewrites the file through a temporary sibling and a rename.
/// Clones share the same in-memory map.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl KeyValueStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StorageError::Format)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            target: TRACING_TARGET_STORAGE,
            path = %path.display(),
            keys = values.len(),
            "Key/value store opened"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner { path, values })),
        })
    }

    /// Returns true if `key` holds a value.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.values.contains_key(key)
    }

    /// Reads the value under `key`.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let inner = self.inner.lock().await;
        inner
            .values
            .get(key)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::Format)
    }

    /// Stores `value` under `key` and persists the store.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value).map_err(StorageError::Format)?;

        let mut inner = self.inner.lock().await;
        inner.values.insert(key.to_owned(), value);
        inner.persist().await
    }

    /// Stores `value` under `key` unless the key is taken, checking and
    /// writing under one lock. Returns whether the value was stored.
    pub async fn insert_new<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<bool> {
        let value = serde_json::to_value(value).map_err(StorageError::Format)?;

        let mut inner = self.inner.lock().await;
        if inner.values.contains_key(key) {
            return Ok(false);
        }

        inner.values.insert(key.to_owned(), value);
        inner.persist().await?;
        Ok(true)
    }

    /// Reads the value under `key`, lets `f` modify it and persists the
    /// result while holding the lock, so concurrent updates never interleave.
    ///
    /// An absent value starts as `T::default()`. Nothing is written if `f`
    /// fails.
    pub async fn update<T, R, E, F>(&self, key: &str, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default + Send,
        R: Send,
        E: From<StorageError>,
        F: FnOnce(&mut T) -> Result<R, E> + Send,
    {
        let mut inner = self.inner.lock().await;

        let mut value = match inner.values.get(key) {
            Some(value) => T::deserialize(value).map_err(StorageError::Format)?,
            None => T::default(),
        };
        let output = f(&mut value)?;

        let value = serde_json::to_value(&value).map_err(StorageError::Format)?;
        inner.values.insert(key.to_owned(), value);
        inner.persist().await?;

        Ok(output)
    }

    /// Removes `key` and persists the store. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> StorageResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.values.remove(key).is_none() {
            return Ok(false);
        }

        inner.persist().await?;
        Ok(true)
    }
}

impl StoreInner {
    async fn persist(&self) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.values).map_err(StorageError::Format)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::trace!(
            target: TRACING_TARGET_STORAGE,
            path = %self.path.display(),
            "Key/value store persisted"
        );

        Ok(())
    }
}
