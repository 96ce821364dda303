//! Diary entries as seen by clients.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use soul_core::{Cursor, Keyed};
use uuid::Uuid;

use crate::{BackendError, Result};

/// Basic emotions a sense can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Force,
    Calmness,
    Sadness,
    Madness,
    Fear,
}

/// The content of a sense.
///
/// Serialized to JSON and stored as the opaque `data` of a [`SenseRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseEntry {
    #[serde(default)]
    pub emotions: Vec<Emotion>,
    pub feelings: String,
    pub body: String,
    pub desires: String,
}

impl SenseEntry {
    /// Creates an entry, trimming every text field.
    ///
    /// Fails if a text field is blank. Duplicate emotions are dropped.
    pub fn new(
        emotions: impl IntoIterator<Item = Emotion>,
        feelings: &str,
        body: &str,
        desires: &str,
    ) -> Result<Self> {
        let mut unique = Vec::new();
        for emotion in emotions {
            if !unique.contains(&emotion) {
                unique.push(emotion);
            }
        }

        Ok(Self {
            emotions: unique,
            feelings: non_blank(feelings, "feelings must not be blank")?,
            body: non_blank(body, "body must not be blank")?,
            desires: non_blank(desires, "desires must not be blank")?,
        })
    }

    /// Serializes the entry into a record payload.
    pub fn to_data(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a record payload.
    pub fn from_data(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

fn non_blank(value: &str, reason: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BackendError::InvalidSense(reason));
    }

    Ok(value.to_owned())
}

/// A sense as both backends store it: an id, a timestamp and a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseRecord {
    pub id: Uuid,
    pub data: String,
    pub created_at: Timestamp,
}

impl Keyed for SenseRecord {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id)
    }
}

/// A decoded sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sense {
    pub id: Uuid,
    pub created_at: Timestamp,
    pub entry: SenseEntry,
}

impl Sense {
    /// Decodes the payload of a record.
    pub fn from_record(record: SenseRecord) -> Result<Self> {
        Ok(Self {
            entry: SenseEntry::from_data(&record.data)?,
            id: record.id,
            created_at: record.created_at,
        })
    }
}

/// One page of senses, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenseList {
    pub data: Vec<Sense>,
    pub limit: i64,
    pub total_items: i64,
    /// Cursor of the newer page.
    pub previous: Option<String>,
    /// Cursor of the older page.
    pub next: Option<String>,
}

/// Capabilities reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub registration_enabled: bool,
}
