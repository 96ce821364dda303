//! The [`DiaryBackend`] trait and backend selection.

mod local;
mod soul;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::local::LocalBackend;
pub use self::soul::{SoulBackend, SoulConfig};
use crate::model::{Options, Sense, SenseEntry, SenseList};
use crate::{KeyValueStore, Result};

/// Which storage a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// A key/value file on this device.
    Local,
    /// A Soul Diary server.
    Soul,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Soul => f.write_str("soul"),
        }
    }
}

/// Storage of one user's diary.
///
/// Methods other than [`options`], [`create_user`] and [`auth`] fail with
/// [`BackendError::NonAuthenticated`] until a user is signed in.
///
/// [`options`]: DiaryBackend::options
/// [`create_user`]: DiaryBackend::create_user
/// [`auth`]: DiaryBackend::auth
/// [`BackendError::NonAuthenticated`]: crate::BackendError::NonAuthenticated
#[async_trait]
pub trait DiaryBackend: fmt::Debug + Send + Sync {
    /// Returns the kind of this backend.
    fn kind(&self) -> BackendKind;

    /// Returns the signed-in username and session token, if any.
    fn session(&self) -> Option<(&str, &str)>;

    /// Reports the backend capabilities.
    async fn options(&self) -> Result<Options>;

    /// Registers a user and signs them in. Returns the session token.
    async fn create_user(&mut self, username: &str, password: &str) -> Result<String>;

    /// Signs a user in. Returns the session token.
    async fn auth(&mut self, username: &str, password: &str) -> Result<String>;

    /// Signs the current user out.
    async fn logout(&mut self) -> Result<()>;

    /// Returns a page of senses, newest first.
    ///
    /// `cursor` is the `previous` or `next` token of an earlier page.
    async fn get_senses(&self, cursor: Option<&str>, limit: i64) -> Result<SenseList>;

    /// Returns one sense.
    async fn get_sense(&self, sense_id: Uuid) -> Result<Sense>;

    /// Stores a new sense.
    async fn create_sense(&self, entry: &SenseEntry) -> Result<Sense>;

    /// Replaces the content of a sense.
    async fn update_sense(&self, sense_id: Uuid, entry: &SenseEntry) -> Result<Sense>;

    /// Deletes a sense.
    async fn delete_sense(&self, sense_id: Uuid) -> Result<()>;
}

/// How to reach a backend.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Key/value file at the given path.
    Local { path: PathBuf },
    /// HTTP API of a Soul Diary server.
    Soul(SoulConfig),
}

impl BackendConfig {
    /// Local storage at `path`.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    /// Remote storage at `url`.
    pub fn soul(url: impl Into<String>) -> Self {
        Self::Soul(SoulConfig::new(url))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local { .. } => BackendKind::Local,
            Self::Soul(_) => BackendKind::Soul,
        }
    }
}

/// Creates the backend described by `config`.
pub async fn connect(config: BackendConfig) -> Result<Box<dyn DiaryBackend>> {
    tracing::debug!(target: crate::TRACING_TARGET_BACKEND, kind = %config.kind(), "Connecting backend");

    let backend: Box<dyn DiaryBackend> = match config {
        BackendConfig::Local { path } => {
            let store = KeyValueStore::open(path).await?;
            Box::new(LocalBackend::new(store))
        }
        BackendConfig::Soul(config) => Box::new(SoulBackend::new(config)?),
    };

    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_selects_backend_by_kind() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let local = connect(BackendConfig::local(dir.path().join("diary.json"))).await?;
        assert_eq!(local.kind(), BackendKind::Local);

        let soul = connect(BackendConfig::soul("http://127.0.0.1:8001")).await?;
        assert_eq!(soul.kind(), BackendKind::Soul);

        Ok(())
    }

    #[test]
    fn kind_serializes_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&BackendKind::Soul)?, "\"soul\"");
        assert_eq!(BackendKind::Local.to_string(), "local");
        Ok(())
    }
}
