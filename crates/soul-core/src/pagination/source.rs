//! Record source abstraction.

use std::future::Future;

use super::Cursor;

/// A record positioned by its `(created_at, id)` key.
pub trait Keyed {
    /// Returns the pivot identifying this record.
    fn cursor(&self) -> Cursor;
}

impl Keyed for Cursor {
    fn cursor(&self) -> Cursor {
        *self
    }
}

/// An ordered collection of records belonging to a single owner.
///
/// Implementations only have to answer three narrow questions. The ordering
/// itself lives in [`Paginator`](super::Paginator), so every storage
/// substrate pages identically.
pub trait RecordSource {
    /// Record type produced by this source.
    type Record: Keyed;
    /// Error raised by the underlying store.
    type Error;

    /// Counts every record in the collection.
    fn count(&mut self) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// Fetches up to `limit` records at or before `pivot`.
    ///
    /// Records are ordered descending by `(created_at, id)`. The pivot itself
    /// is included when present. Without a pivot the newest records are
    /// returned.
    fn fetch_before(
        &mut self,
        pivot: Option<Cursor>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send;

    /// Fetches up to `take` records strictly after `pivot`, skipping the first
    /// `skip` of them.
    ///
    /// Records are ordered ascending by `(created_at, id)`, so the first one
    /// is the record immediately newer than the pivot.
    fn fetch_after(
        &mut self,
        pivot: Cursor,
        skip: i64,
        take: i64,
    ) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send;
}
