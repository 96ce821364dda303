//! Account session model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::account_sessions;

/// A bearer token issued at sign-up or sign-in.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = account_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountSession {
    /// 32 lowercase hexadecimal characters.
    pub token: String,
    /// Account the token authenticates.
    pub account_id: Uuid,
    /// Issue time.
    pub created_at: Timestamp,
}

/// Data for issuing a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccountSession {
    pub token: String,
    pub account_id: Uuid,
}
