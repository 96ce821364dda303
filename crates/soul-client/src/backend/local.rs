use async_trait::async_trait;
use jiff::Timestamp;
use sha2::{Digest, Sha256};
use soul_core::{Keyed, PageRequest, Paginator, SnapshotSource};
use uuid::Uuid;

use super::{BackendKind, DiaryBackend};
use crate::model::{Options, Sense, SenseEntry, SenseList, SenseRecord};
use crate::{BackendError, KeyValueStore, Result, TRACING_TARGET_BACKEND};

fn auth_block_key(username: &str) -> String {
    format!("soul_diary.backend.users.{username}.auth_block")
}

fn senses_key(username: &str) -> String {
    format!("soul_diary.backend.users.{username}.senses")
}

/// Hex SHA-256 of `auth_block:{username}:{password}`.
fn auth_block(username: &str, password: &str) -> String {
    let digest = Sha256::digest(format!("auth_block:{username}:{password}").as_bytes());
    hex::encode(digest)
}

/// Current time truncated to microseconds, the resolution cursors keep.
fn now_micros() -> Timestamp {
    let now = Timestamp::now();
    Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now)
}

#[derive(Debug, Clone)]
struct LocalSession {
    username: String,
    auth_block: String,
}

/// Diary kept in a [`KeyValueStore`] on this device.
///
/// Each user has an auth block, the SHA-256 of their credentials, and a
/// newest-first list of [`SenseRecord`]s. Pages use the same cursors as the
/// server.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    store: KeyValueStore,
    session: Option<LocalSession>,
}

impl LocalBackend {
    pub fn new(store: KeyValueStore) -> Self {
        Self {
            store,
            session: None,
        }
    }

    /// Resumes a session saved earlier.
    ///
    /// Fails with [`BackendError::NonAuthenticated`] if the token does not
    /// match the stored auth block.
    pub async fn resume(store: KeyValueStore, username: &str, token: &str) -> Result<Self> {
        let stored: Option<String> = store.read(&auth_block_key(username)).await?;
        if stored.as_deref() != Some(token) {
            return Err(BackendError::NonAuthenticated);
        }

        Ok(Self {
            store,
            session: Some(LocalSession {
                username: username.to_owned(),
                auth_block: token.to_owned(),
            }),
        })
    }

    fn username(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|session| session.username.as_str())
            .ok_or(BackendError::NonAuthenticated)
    }

    async fn load_records(&self) -> Result<Vec<SenseRecord>> {
        let key = senses_key(self.username()?);
        Ok(self.store.read(&key).await?.unwrap_or_default())
    }

    /// Runs `f` on this user's sense list and saves it newest first, holding
    /// the store lock throughout.
    async fn update_records<R, F>(&self, f: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<SenseRecord>) -> Result<R> + Send,
    {
        let key = senses_key(self.username()?);
        self.store
            .update(&key, |records: &mut Vec<SenseRecord>| {
                let output = f(records);
                records.sort_by_key(|record| std::cmp::Reverse(record.cursor()));
                output
            })
            .await
    }

    /// Inserts a record as is, keeping the list ordered newest first.
    async fn insert_record(&self, record: SenseRecord) -> Result<()> {
        self.update_records(|records| {
            records.push(record);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl DiaryBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn session(&self) -> Option<(&str, &str)> {
        self.session
            .as_ref()
            .map(|session| (session.username.as_str(), session.auth_block.as_str()))
    }

    async fn options(&self) -> Result<Options> {
        Ok(Options {
            registration_enabled: true,
        })
    }

    async fn create_user(&mut self, username: &str, password: &str) -> Result<String> {
        let block = auth_block(username, password);
        if !self.store.insert_new(&auth_block_key(username), &block).await? {
            return Err(BackendError::UserAlreadyExists);
        }

        tracing::info!(target: TRACING_TARGET_BACKEND, username, "Local user created");

        self.session = Some(LocalSession {
            username: username.to_owned(),
            auth_block: block.clone(),
        });
        Ok(block)
    }

    async fn auth(&mut self, username: &str, password: &str) -> Result<String> {
        let stored: Option<String> = self.store.read(&auth_block_key(username)).await?;
        let block = auth_block(username, password);

        if stored.as_deref() != Some(block.as_str()) {
            tracing::debug!(target: TRACING_TARGET_BACKEND, "Local sign-in rejected");
            return Err(BackendError::IncorrectCredentials);
        }

        self.session = Some(LocalSession {
            username: username.to_owned(),
            auth_block: block.clone(),
        });
        Ok(block)
    }

    async fn logout(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }

    async fn get_senses(&self, cursor: Option<&str>, limit: i64) -> Result<SenseList> {
        let request = PageRequest::new(cursor, limit)?;
        let mut source = SnapshotSource::new(self.load_records().await?);

        let page = match source.paginate(&request).await {
            Ok(page) => page,
            Err(never) => match never {},
        };
        let page = page.map(Sense::from_record);

        Ok(SenseList {
            data: page.items.into_iter().collect::<Result<_>>()?,
            limit: page.limit,
            total_items: page.total_items,
            previous: page.previous.map(|cursor| cursor.encode()),
            next: page.next.map(|cursor| cursor.encode()),
        })
    }

    async fn get_sense(&self, sense_id: Uuid) -> Result<Sense> {
        let record = self
            .load_records()
            .await?
            .into_iter()
            .find(|record| record.id == sense_id)
            .ok_or(BackendError::SenseNotFound)?;

        Sense::from_record(record)
    }

    async fn create_sense(&self, entry: &SenseEntry) -> Result<Sense> {
        let data = entry.to_data()?;

        let record = self
            .update_records(|records| {
                let mut id = Uuid::new_v4();
                while records.iter().any(|record| record.id == id) {
                    id = Uuid::new_v4();
                }

                let record = SenseRecord {
                    id,
                    data,
                    created_at: now_micros(),
                };
                records.push(record.clone());
                Ok(record)
            })
            .await?;

        tracing::debug!(target: TRACING_TARGET_BACKEND, sense_id = %record.id, "Local sense created");
        Sense::from_record(record)
    }

    async fn update_sense(&self, sense_id: Uuid, entry: &SenseEntry) -> Result<Sense> {
        let data = entry.to_data()?;

        let updated = self
            .update_records(|records| {
                let record = records
                    .iter_mut()
                    .find(|record| record.id == sense_id)
                    .ok_or(BackendError::SenseNotFound)?;

                record.data = data;
                Ok(record.clone())
            })
            .await?;

        Sense::from_record(updated)
    }

    async fn delete_sense(&self, sense_id: Uuid) -> Result<()> {
        self.update_records(|records| {
            let before = records.len();
            records.retain(|record| record.id != sense_id);

            if records.len() == before {
                return Err(BackendError::SenseNotFound);
            }
            Ok(())
        })
        .await
    }
}
