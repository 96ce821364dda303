//! Opaque-cursor keyset pagination.
//!
//! Records are ordered newest first by `(created_at, id)`. A page is fetched
//! relative to a pivot decoded from an opaque [`Cursor`], and every page
//! carries cursors for its neighbours in both directions.

mod cursor;
mod error;
mod page;
mod paginator;
mod snapshot;
mod source;

pub use cursor::Cursor;
pub use error::{PaginationError, PaginationResult};
pub use page::{CursorPage, DEFAULT_LIMIT, PageRequest};
pub use paginator::Paginator;
pub use snapshot::SnapshotSource;
pub use source::{Keyed, RecordSource};
