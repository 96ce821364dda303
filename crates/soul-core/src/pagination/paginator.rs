//! Keyset paginator shared by every record source.

use std::future::Future;

use super::{CursorPage, Keyed, PageRequest, RecordSource};
use crate::TRACING_TARGET_PAGINATION;

/// Pages over any [`RecordSource`].
///
/// A page is the run of `limit` records starting at the pivot. The record
/// right after the page becomes the `next` cursor. The `previous` cursor is
/// the record `limit` positions newer than the pivot, so following it lands
/// exactly on the page whose `next` is the current pivot.
pub trait Paginator: RecordSource {
    /// Runs a validated page request against this source.
    ///
    /// Either a complete page is returned or the store error is propagated.
    fn paginate(
        &mut self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<CursorPage<Self::Record>, Self::Error>> + Send;
}

impl<S> Paginator for S
where
    S: RecordSource + Send,
    S::Record: Send,
    S::Error: Send,
{
    async fn paginate(
        &mut self,
        request: &PageRequest,
    ) -> Result<CursorPage<Self::Record>, Self::Error> {
        let limit = request.limit();
        let pivot = request.cursor();

        let total_items = self.count().await?;
        let mut items = self.fetch_before(pivot, request.fetch_limit()).await?;

        let page_len = usize::try_from(limit).unwrap_or(usize::MAX);
        let next = if items.len() > page_len {
            let next = items[page_len].cursor();
            items.truncate(page_len);
            Some(next)
        } else {
            None
        };

        let previous = match pivot {
            Some(pivot) => self
                .fetch_after(pivot, limit - 1, 1)
                .await?
                .first()
                .map(Keyed::cursor),
            None => None,
        };

        tracing::debug!(
            target: TRACING_TARGET_PAGINATION,
            limit,
            total_items,
            returned = items.len(),
            has_previous = previous.is_some(),
            has_next = next.is_some(),
            "Page assembled"
        );

        Ok(CursorPage {
            items,
            limit,
            total_items,
            previous,
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;
    use crate::pagination::{Cursor, SnapshotSource};

    /// Builds `len` cursors where every three records share a timestamp and
    /// identifiers are scrambled relative to insertion order.
    fn collection(len: u64) -> Vec<Cursor> {
        (0..len)
            .map(|i| {
                let micros = 1_700_000_000_000_000 + i64::try_from(i / 3).unwrap() * 1_000;
                let id = u128::from(i).wrapping_mul(0x9E37_79B9_7F4A_7C15_F39C_C060_5CED_C835);
                Cursor::new(Timestamp::from_microsecond(micros).unwrap(), Uuid::from_u128(id))
            })
            .collect()
    }

    fn sorted_desc(mut records: Vec<Cursor>) -> Vec<Cursor> {
        records.sort_by(|a, b| b.cmp(a));
        records
    }

    async fn page(
        source: &mut SnapshotSource<Cursor>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> CursorPage<Cursor> {
        let request = match cursor {
            Some(cursor) => PageRequest::with_cursor(cursor, limit).unwrap(),
            None => PageRequest::first(limit).unwrap(),
        };
        source.paginate(&request).await.unwrap()
    }

    async fn walk_forward(records: Vec<Cursor>, limit: i64) -> Vec<CursorPage<Cursor>> {
        let mut source = SnapshotSource::new(records);
        let mut pages = vec![page(&mut source, None, limit).await];
        while let Some(next) = pages.last().and_then(|p| p.next) {
            pages.push(page(&mut source, Some(next), limit).await);
        }
        pages
    }

    #[tokio::test]
    async fn first_page_of_twenty_five_with_limit_ten() {
        let records = collection(25);
        let expected = sorted_desc(records.clone());

        let mut source = SnapshotSource::new(records);
        let page = page(&mut source, None, 10).await;

        assert_eq!(page.items, expected[..10].to_vec());
        assert_eq!(page.total_items, 25);
        assert_eq!(page.limit, 10);
        assert!(page.previous.is_none());

        let next = Cursor::decode(&page.next.unwrap().encode()).unwrap();
        assert_eq!(next, expected[10]);
    }

    #[tokio::test]
    async fn forward_walk_yields_every_record_once_in_order() {
        for len in [0, 1, 2, 9, 10, 11, 25, 30, 31] {
            for limit in [1, 2, 3, 7, 10, 50] {
                let records = collection(len);
                let expected = sorted_desc(records.clone());

                let pages = walk_forward(records, limit).await;
                let walked: Vec<Cursor> = pages.iter().flat_map(|p| p.items.clone()).collect();

                assert_eq!(walked, expected, "len={len} limit={limit}");
                assert!(pages.iter().all(|p| p.items.len() as i64 <= limit));
                assert!(pages.iter().all(|p| p.total_items == len as i64));
            }
        }
    }

    #[tokio::test]
    async fn previous_cursor_returns_the_preceding_page() {
        for limit in [1, 3, 4, 10] {
            let pages = walk_forward(collection(23), limit).await;
            let mut source = SnapshotSource::new(collection(23));

            assert!(pages[0].previous.is_none());
            for k in 1..pages.len() {
                let previous = pages[k].previous.expect("previous cursor");
                let back = page(&mut source, Some(previous), limit).await;

                assert_eq!(back, pages[k - 1], "limit={limit} page={k}");
            }
        }
    }

    #[tokio::test]
    async fn next_of_previous_is_the_original_cursor() {
        let limit = 4;
        let pages = walk_forward(collection(17), limit).await;
        let mut source = SnapshotSource::new(collection(17));

        for current in pages.iter().skip(1) {
            let cursor = current.items[0];
            let previous = current.previous.unwrap();
            let back = page(&mut source, Some(previous), limit).await;
            assert_eq!(back.next, Some(cursor));
        }
    }

    #[tokio::test]
    async fn previous_is_absent_when_pivot_is_within_first_page() {
        let expected = sorted_desc(collection(12));
        let mut source = SnapshotSource::new(collection(12));

        let page = page(&mut source, Some(expected[3]), 5).await;
        assert_eq!(page.items, expected[3..8].to_vec());
        assert!(page.previous.is_none());
        assert_eq!(page.next, Some(expected[8]));
    }

    #[tokio::test]
    async fn duplicate_timestamps_are_split_by_id() {
        let timestamp = Timestamp::from_second(1_700_000_000).unwrap();
        let low = Cursor::new(timestamp, Uuid::from_u128(1));
        let high = Cursor::new(timestamp, Uuid::from_u128(2));
        let mut source = SnapshotSource::new(vec![low, high]);

        let first = page(&mut source, None, 1).await;
        assert_eq!(first.items, vec![high]);
        assert_eq!(first.next, Some(low));

        let second = page(&mut source, first.next, 1).await;
        assert_eq!(second.items, vec![low]);
        assert_eq!(second.previous, Some(high));
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn cursor_for_missing_record_starts_at_next_older() {
        let expected = sorted_desc(collection(9));
        let mut source = SnapshotSource::new(collection(9));

        let gap = Cursor::new(expected[4].timestamp, Uuid::max());
        let page = page(&mut source, Some(gap), 3).await;
        assert!(page.items.iter().all(|item| *item <= gap));
        assert_eq!(page.items.first(), expected.iter().find(|item| **item <= gap));
    }

    #[tokio::test]
    async fn empty_collection_yields_empty_page() {
        let mut source = SnapshotSource::<Cursor>::new(Vec::new());
        let page = page(&mut source, None, 10).await;

        assert_eq!(page, CursorPage::empty(10));
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        type Error = &'static str;
        type Record = Cursor;

        async fn count(&mut self) -> Result<i64, Self::Error> {
            Ok(3)
        }

        async fn fetch_before(
            &mut self,
            _pivot: Option<Cursor>,
            _limit: i64,
        ) -> Result<Vec<Cursor>, Self::Error> {
            Err("store unavailable")
        }

        async fn fetch_after(
            &mut self,
            _pivot: Cursor,
            _skip: i64,
            _take: i64,
        ) -> Result<Vec<Cursor>, Self::Error> {
            Ok(Vec::new())
        }
    }

    /// Evaluates each query the way the relational store does: filter the
    /// unordered table by the keyset predicate, then order and slice.
    struct PredicateSource(Vec<Cursor>);

    impl RecordSource for PredicateSource {
        type Error = &'static str;
        type Record = Cursor;

        async fn count(&mut self) -> Result<i64, Self::Error> {
            Ok(i64::try_from(self.0.len()).unwrap())
        }

        async fn fetch_before(
            &mut self,
            pivot: Option<Cursor>,
            limit: i64,
        ) -> Result<Vec<Cursor>, Self::Error> {
            let mut rows: Vec<Cursor> = self
                .0
                .iter()
                .copied()
                .filter(|row| pivot.is_none_or(|pivot| *row <= pivot))
                .collect();
            rows.sort_by(|a, b| b.cmp(a));
            rows.truncate(usize::try_from(limit).unwrap());
            Ok(rows)
        }

        async fn fetch_after(
            &mut self,
            pivot: Cursor,
            skip: i64,
            take: i64,
        ) -> Result<Vec<Cursor>, Self::Error> {
            let mut rows: Vec<Cursor> = self.0.iter().copied().filter(|row| *row > pivot).collect();
            rows.sort();
            Ok(rows
                .into_iter()
                .skip(usize::try_from(skip).unwrap())
                .take(usize::try_from(take).unwrap())
                .collect())
        }
    }

    #[tokio::test]
    async fn snapshot_and_predicate_sources_agree() {
        let records = collection(23);
        let mut snapshot = SnapshotSource::new(records.clone());
        let mut predicate = PredicateSource(records.clone());

        let mut pivots: Vec<Option<Cursor>> = records.iter().copied().map(Some).collect();
        pivots.push(None);
        pivots.push(Some(Cursor::new(Timestamp::UNIX_EPOCH, Uuid::nil())));

        for limit in [1, 2, 3, 7, 10, 25] {
            for pivot in &pivots {
                let request = match pivot {
                    Some(cursor) => PageRequest::with_cursor(*cursor, limit).unwrap(),
                    None => PageRequest::first(limit).unwrap(),
                };
                let expected = snapshot.paginate(&request).await.unwrap();
                let actual = predicate.paginate(&request).await.unwrap();
                assert_eq!(actual, expected, "limit {limit}, pivot {pivot:?}");
            }
        }
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let request = PageRequest::first(10).unwrap();
        let error = FailingSource.paginate(&request).await.unwrap_err();
        assert_eq!(error, "store unavailable");
    }
}
