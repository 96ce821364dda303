//! In-memory record source.

use std::convert::Infallible;

use super::{Cursor, Keyed, RecordSource};

/// A record source over an in-memory snapshot of a collection.
///
/// The snapshot is sorted newest first on construction and never changes
/// while a page is being assembled.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource<R> {
    records: Vec<R>,
}

impl<R: Keyed> SnapshotSource<R> {
    /// Creates a snapshot, sorting the records by `(created_at, id)` descending.
    pub fn new(mut records: Vec<R>) -> Self {
        records.sort_by_key(|record| std::cmp::Reverse(record.cursor()));
        Self { records }
    }

    /// Returns the index of the first record at or before the pivot.
    fn locate(&self, pivot: Option<Cursor>) -> usize {
        match pivot {
            Some(pivot) => self
                .records
                .iter()
                .take_while(|record| record.cursor() > pivot)
                .count(),
            None => 0,
        }
    }

    /// Returns the records, newest first.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consumes the snapshot and returns the sorted records.
    pub fn into_inner(self) -> Vec<R> {
        self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(if value < 0 { 0 } else { usize::MAX })
}

impl<R> RecordSource for SnapshotSource<R>
where
    R: Keyed + Clone + Send + Sync,
{
    type Error = Infallible;
    type Record = R;

    async fn count(&mut self) -> Result<i64, Self::Error> {
        Ok(i64::try_from(self.records.len()).unwrap_or(i64::MAX))
    }

    async fn fetch_before(
        &mut self,
        pivot: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<R>, Self::Error> {
        let start = self.locate(pivot);
        Ok(self.records[start..]
            .iter()
            .take(to_usize(limit))
            .cloned()
            .collect())
    }

    async fn fetch_after(
        &mut self,
        pivot: Cursor,
        skip: i64,
        take: i64,
    ) -> Result<Vec<R>, Self::Error> {
        let end = self.locate(Some(pivot));
        Ok(self.records[..end]
            .iter()
            .rev()
            .skip(to_usize(skip))
            .take(to_usize(take))
            .cloned()
            .collect())
    }
}
