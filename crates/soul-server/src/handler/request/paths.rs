//! Path parameter types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters of `/senses/{id}`.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct SensePathParams {
    /// Identifier of the sense.
    pub id: Uuid,
}
