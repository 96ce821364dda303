//! Page request and page result types.

use super::{Cursor, PaginationError, PaginationResult};

/// Number of records returned when the caller does not ask for a page size.
pub const DEFAULT_LIMIT: i64 = 10;

/// Validated pagination input.
///
/// Construction fails with [`PaginationError`] for malformed cursors and
/// non-positive limits, so a `PageRequest` in hand is always safe to run
/// against a record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    cursor: Option<Cursor>,
    limit: i64,
}

impl PageRequest {
    /// Creates a request from an optional opaque cursor token.
    pub fn new(cursor: Option<&str>, limit: i64) -> PaginationResult<Self> {
        let limit = Self::validate_limit(limit)?;
        let cursor = cursor.map(Cursor::decode).transpose()?;
        Ok(Self { cursor, limit })
    }

    /// Creates a request from an already decoded cursor.
    pub fn with_cursor(cursor: Cursor, limit: i64) -> PaginationResult<Self> {
        let limit = Self::validate_limit(limit)?;
        Ok(Self {
            cursor: Some(cursor),
            limit,
        })
    }

    /// Creates a request for the newest page.
    pub fn first(limit: i64) -> PaginationResult<Self> {
        let limit = Self::validate_limit(limit)?;
        Ok(Self {
            cursor: None,
            limit,
        })
    }

    /// Returns the pivot of this request, if any.
    #[inline]
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Returns the requested page size.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Returns the limit plus one, used to detect whether a next page exists.
    #[inline]
    pub fn fetch_limit(&self) -> i64 {
        self.limit.saturating_add(1)
    }

    fn validate_limit(limit: i64) -> PaginationResult<i64> {
        if limit <= 0 {
            return Err(PaginationError::InvalidLimit(limit));
        }

        Ok(limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A page of records with cursors to its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    /// Records of this page, newest first.
    pub items: Vec<T>,
    /// Page size the page was requested with.
    pub limit: i64,
    /// Number of records in the whole collection.
    pub total_items: i64,
    /// Cursor of the page before this one.
    pub previous: Option<Cursor>,
    /// Cursor of the page after this one.
    pub next: Option<Cursor>,
}

impl<T> CursorPage<T> {
    /// Creates an empty page.
    pub fn empty(limit: i64) -> Self {
        Self {
            items: Vec::new(),
            limit,
            total_items: 0,
            previous: None,
            next: None,
        }
    }

    /// Returns true if a newer page exists.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Returns true if an older page exists.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> CursorPage<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            total_items: self.total_items,
            previous: self.previous,
            next: self.next,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn page_request_rejects_non_positive_limits() {
        assert_eq!(
            PageRequest::new(None, 0).unwrap_err(),
            PaginationError::InvalidLimit(0)
        );
        assert_eq!(
            PageRequest::new(None, -1).unwrap_err(),
            PaginationError::InvalidLimit(-1)
        );
        assert!(PageRequest::first(0).is_err());
    }

    #[test]
    fn page_request_rejects_malformed_cursor() {
        let error = PageRequest::new(Some("%%%"), 10).unwrap_err();
        assert!(error.is_invalid_cursor());

        let error = PageRequest::new(Some(""), 10).unwrap_err();
        assert!(error.is_invalid_cursor());
    }

    #[test]
    fn page_request_decodes_cursor() {
        let cursor = Cursor::new(Timestamp::from_second(1_000).unwrap(), Uuid::new_v4());
        let token = cursor.encode();

        let request = PageRequest::new(Some(&token), 5).unwrap();
        assert_eq!(request.cursor(), Some(cursor));
        assert_eq!(request.limit(), 5);
        assert_eq!(request.fetch_limit(), 6);
    }

    #[test]
    fn page_request_default() {
        let request = PageRequest::default();
        assert_eq!(request.limit(), DEFAULT_LIMIT);
        assert!(request.cursor().is_none());
    }

    #[test]
    fn cursor_page_map_keeps_cursors() {
        let cursor = Cursor::new(Timestamp::UNIX_EPOCH, Uuid::nil());
        let page = CursorPage {
            items: vec![1, 2, 3],
            limit: 3,
            total_items: 9,
            previous: None,
            next: Some(cursor),
        };

        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total_items, 9);
        assert!(mapped.has_next());
        assert!(!mapped.has_previous());
    }
}
