//! Authentication response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use soul_postgres::model::AccountSession;

/// Bearer token issued by `/signup` and `/signin`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionToken {
    /// Send as `Authorization: Bearer <token>`.
    pub token: String,
}

impl SessionToken {
    pub fn from_model(session: AccountSession) -> Self {
        Self {
            token: session.token,
        }
    }
}

/// Server capabilities returned by `/options`.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ServerOptions {
    /// Whether `/signup` accepts new accounts.
    pub registration_enabled: bool,
}
