//! Sense (diary entry) model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use soul_core::{Cursor, Keyed};
use uuid::Uuid;

use crate::schema::senses;

/// A diary entry with an opaque payload.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = senses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sense {
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Client-serialized entry, never inspected by the server.
    pub data: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Keyed for Sense {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at.into(), self.id)
    }
}

/// Data for creating a sense.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = senses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSense {
    pub account_id: Uuid,
    pub data: String,
}

/// Replacement payload for an existing sense.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = senses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSense {
    pub data: String,
    pub updated_at: Timestamp,
}

impl UpdateSense {
    /// Creates an update that replaces the payload and bumps `updated_at`.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            updated_at: jiff::Timestamp::now().into(),
        }
    }
}
