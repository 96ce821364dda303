//! Cursor pagination query parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use soul_core::{DEFAULT_LIMIT, PageRequest};

use crate::handler::{ErrorKind, Result};

/// Largest page the server returns.
pub const MAX_LIMIT: i64 = 100;

/// Query parameters of keyset paginated listings.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CursorPagination {
    /// Opaque `previous` or `next` cursor of an earlier page.
    ///
    /// Omit it to start from the newest record.
    pub cursor: Option<String>,

    /// Page size, 1 to 100. Defaults to 10.
    pub limit: Option<i64>,
}

impl CursorPagination {
    /// Returns the requested page size or the default.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Validates the parameters into a [`PageRequest`].
    ///
    /// A present but undecodable cursor is rejected, never treated as absent.
    pub fn into_page_request(self) -> Result<PageRequest> {
        let limit = self.limit();
        if limit > MAX_LIMIT {
            return Err(ErrorKind::InvalidLimit
                .with_message(format!("Limit may not exceed {MAX_LIMIT}"))
                .with_resource("pagination"));
        }

        Ok(PageRequest::new(self.cursor.as_deref(), limit)?)
    }
}
