//! Sense request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use soul_postgres::model::{NewSense, UpdateSense};
use uuid::Uuid;

/// Body of sense creation and update requests.
///
/// `data` is produced by the client and stored verbatim.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SenseData {
    /// Client-serialized diary entry.
    pub data: String,
}

impl SenseData {
    /// Converts the body into an insert for the given account.
    pub fn into_model(self, account_id: Uuid) -> NewSense {
        NewSense {
            account_id,
            data: self.data,
        }
    }

    /// Converts the body into a payload replacement.
    pub fn into_update(self) -> UpdateSense {
        UpdateSense::new(self.data)
    }
}
