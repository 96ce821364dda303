//! Sense response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use soul_core::CursorPage;
use soul_postgres::model;
use uuid::Uuid;

/// A diary entry as seen by its owner.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sense {
    pub id: Uuid,
    /// Client-serialized entry.
    pub data: String,
    pub created_at: Timestamp,
}

impl Sense {
    pub fn from_model(sense: model::Sense) -> Self {
        Self {
            id: sense.id,
            data: sense.data,
            created_at: sense.created_at.into(),
        }
    }
}

/// One page of an account's senses, newest first.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SensesPage {
    /// Senses of this page.
    pub data: Vec<Sense>,
    /// Page size the page was requested with.
    pub limit: i64,
    /// Number of senses the account owns.
    pub total_items: i64,
    /// Cursor of the newer page, absent on the first page.
    pub previous: Option<String>,
    /// Cursor of the older page, absent on the last page.
    pub next: Option<String>,
}

impl SensesPage {
    pub fn from_cursor_page(page: CursorPage<model::Sense>) -> Self {
        Self {
            previous: page.previous.map(|cursor| cursor.encode()),
            next: page.next.map(|cursor| cursor.encode()),
            limit: page.limit,
            total_items: page.total_items,
            data: page.items.into_iter().map(Sense::from_model).collect(),
        }
    }
}
