//! Sense repository and the relational record source used for paging.

use std::future::Future;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::{ScopedBoxFuture, ScopedFutureExt};
use soul_core::{Cursor, CursorPage, PageRequest, Paginator, RecordSource};
use uuid::Uuid;

use crate::model::{NewSense, Sense, UpdateSense};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Sense storage for a single owner at a time.
pub trait SenseRepository {
    /// Inserts a sense. `created_at` is assigned by the database.
    fn create_sense(
        &mut self,
        new_sense: NewSense,
    ) -> impl Future<Output = PgResult<Sense>> + Send;

    /// Finds a sense by identifier regardless of owner.
    fn find_sense_by_id(
        &mut self,
        sense_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Sense>>> + Send;

    /// Replaces the payload of a sense.
    fn update_sense(
        &mut self,
        sense_id: Uuid,
        updates: UpdateSense,
    ) -> impl Future<Output = PgResult<Sense>> + Send;

    /// Deletes a sense. Returns false if it did not exist.
    fn delete_sense(&mut self, sense_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns one page of an account's senses, newest first.
    ///
    /// The count, the page and the previous-cursor lookup run in one
    /// read-only `REPEATABLE READ` transaction, so they all see the same
    /// snapshot.
    fn cursor_list_senses(
        &mut self,
        account_id: Uuid,
        request: PageRequest,
    ) -> impl Future<Output = PgResult<CursorPage<Sense>>> + Send;
}

impl SenseRepository for PgConnection {
    async fn create_sense(&mut self, new_sense: NewSense) -> PgResult<Sense> {
        use schema::senses;

        diesel::insert_into(senses::table)
            .values(&new_sense)
            .returning(Sense::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_sense_by_id(&mut self, sense_id: Uuid) -> PgResult<Option<Sense>> {
        use schema::senses::{self, dsl};

        senses::table
            .filter(dsl::id.eq(sense_id))
            .select(Sense::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_sense(&mut self, sense_id: Uuid, updates: UpdateSense) -> PgResult<Sense> {
        use schema::senses::{self, dsl};

        diesel::update(senses::table.filter(dsl::id.eq(sense_id)))
            .set(&updates)
            .returning(Sense::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_sense(&mut self, sense_id: Uuid) -> PgResult<bool> {
        use schema::senses::{self, dsl};

        let deleted = diesel::delete(senses::table.filter(dsl::id.eq(sense_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn cursor_list_senses(
        &mut self,
        account_id: Uuid,
        request: PageRequest,
    ) -> PgResult<CursorPage<Sense>> {
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %account_id,
            limit = request.limit(),
            has_cursor = request.cursor().is_some(),
            "Listing senses"
        );

        read_snapshot(self, |conn| {
            async move { SensePageSource::new(conn, account_id).paginate(&request).await }
                .scope_boxed()
        })
        .await
    }
}

/// Runs `f` in a read-only `REPEATABLE READ` transaction.
///
/// Every statement inside sees the snapshot taken by the first one.
pub(crate) async fn read_snapshot<'a, T, F>(conn: &'a mut PgConnection, f: F) -> PgResult<T>
where
    F: for<'r> FnOnce(&'r mut PgConnection) -> ScopedBoxFuture<'a, 'r, PgResult<T>> + Send + 'a,
    T: Send + 'a,
{
    conn.build_transaction()
        .read_only()
        .repeatable_read()
        .run(f)
        .await
}

/// Statement selecting one account's senses, boxed so the pivot filter and
/// the ordering can vary.
type SenseQuery = schema::senses::BoxedQuery<'static, Pg>;

fn pivot_time(pivot: &Cursor) -> jiff_diesel::Timestamp {
    jiff_diesel::Timestamp::from(pivot.timestamp)
}

/// Newest-first senses at or older than `pivot`, at most `limit` of them.
fn before_query(account_id: Uuid, pivot: Option<Cursor>, limit: i64) -> SenseQuery {
    use schema::senses::{self, dsl};

    let mut query = senses::table
        .filter(dsl::account_id.eq(account_id))
        .into_boxed();

    if let Some(pivot) = pivot {
        query = query.filter(
            dsl::created_at
                .lt(pivot_time(&pivot))
                .or(dsl::created_at.eq(pivot_time(&pivot)).and(dsl::id.le(pivot.id))),
        );
    }

    query
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .limit(limit)
}

/// Oldest-first senses strictly newer than `pivot`, skipping `skip`.
fn after_query(account_id: Uuid, pivot: Cursor, skip: i64, take: i64) -> SenseQuery {
    use schema::senses::{self, dsl};

    senses::table
        .filter(dsl::account_id.eq(account_id))
        .filter(
            dsl::created_at
                .gt(pivot_time(&pivot))
                .or(dsl::created_at.eq(pivot_time(&pivot)).and(dsl::id.gt(pivot.id))),
        )
        .order((dsl::created_at.asc(), dsl::id.asc()))
        .offset(skip)
        .limit(take)
        .into_boxed()
}

/// Senses of one account as a [`RecordSource`].
///
/// Run it inside a transaction when count and fetches must agree.
pub struct SensePageSource<'a> {
    conn: &'a mut PgConnection,
    account_id: Uuid,
}

impl<'a> SensePageSource<'a> {
    pub fn new(conn: &'a mut PgConnection, account_id: Uuid) -> Self {
        Self { conn, account_id }
    }
}

impl RecordSource for SensePageSource<'_> {
    type Error = PgError;
    type Record = Sense;

    async fn count(&mut self) -> PgResult<i64> {
        use schema::senses::{self, dsl};

        senses::table
            .filter(dsl::account_id.eq(self.account_id))
            .count()
            .get_result(&mut *self.conn)
            .await
            .map_err(PgError::from)
    }

    async fn fetch_before(&mut self, pivot: Option<Cursor>, limit: i64) -> PgResult<Vec<Sense>> {
        before_query(self.account_id, pivot, limit)
            .select(Sense::as_select())
            .load(&mut *self.conn)
            .await
            .map_err(PgError::from)
    }

    async fn fetch_after(&mut self, pivot: Cursor, skip: i64, take: i64) -> PgResult<Vec<Sense>> {
        after_query(self.account_id, pivot, skip, take)
            .select(Sense::as_select())
            .load(&mut *self.conn)
            .await
            .map_err(PgError::from)
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel_async::AsyncConnection;
    use jiff::Timestamp;

    use super::*;

    fn pivot() -> Cursor {
        Cursor::new(
            Timestamp::from_microsecond(1_700_000_000_000_000).unwrap(),
            Uuid::from_u128(7),
        )
    }

    fn render(query: &SenseQuery) -> String {
        debug_query::<Pg, _>(query).to_string()
    }

    #[test]
    fn first_page_filters_by_owner_only() {
        let sql = render(&before_query(Uuid::nil(), None, 11));

        assert!(sql.contains(r#""senses"."account_id" = $1"#), "{sql}");
        assert!(!sql.contains(r#""senses"."created_at" <"#), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "senses"."created_at" DESC, "senses"."id" DESC LIMIT $2"#),
            "{sql}"
        );
        assert!(!sql.contains("OFFSET"), "{sql}");
    }

    #[test]
    fn page_from_pivot_includes_the_pivot_and_walks_older() {
        let sql = render(&before_query(Uuid::nil(), Some(pivot()), 11));

        assert!(sql.contains(r#""senses"."account_id" = $1"#), "{sql}");
        assert!(sql.contains(r#""senses"."created_at" < $2"#), "{sql}");
        assert!(sql.contains(r#""senses"."created_at" = $3"#), "{sql}");
        assert!(sql.contains(r#""senses"."id" <= $4"#), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "senses"."created_at" DESC, "senses"."id" DESC LIMIT $5"#),
            "{sql}"
        );
        assert!(!sql.contains("OFFSET"), "{sql}");
    }

    #[test]
    fn previous_lookup_excludes_the_pivot_and_walks_newer() {
        let sql = render(&after_query(Uuid::nil(), pivot(), 9, 1));

        assert!(sql.contains(r#""senses"."account_id" = $1"#), "{sql}");
        assert!(sql.contains(r#""senses"."created_at" > $2"#), "{sql}");
        assert!(sql.contains(r#""senses"."created_at" = $3"#), "{sql}");
        assert!(sql.contains(r#""senses"."id" > $4"#), "{sql}");
        assert!(!sql.contains("<="), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "senses"."created_at" ASC, "senses"."id" ASC"#),
            "{sql}"
        );
        assert!(sql.contains("LIMIT $5 OFFSET $6"), "{sql}");
        assert!(sql.contains("binds: [00000000-0000-0000-0000-000000000000"), "{sql}");
        assert!(sql.ends_with("1, 9]"), "{sql}");
    }

    #[derive(QueryableByName)]
    struct Setting {
        #[diesel(sql_type = diesel::sql_types::Text)]
        value: String,
    }

    async fn setting(conn: &mut PgConnection, name: &str) -> PgResult<String> {
        let setting: Setting = diesel::sql_query("SELECT current_setting($1) AS value")
            .bind::<diesel::sql_types::Text, _>(name)
            .get_result(conn)
            .await?;
        Ok(setting.value)
    }

    /// Needs a reachable database in `SOUL_TEST_POSTGRES_URL`; skipped otherwise.
    #[tokio::test]
    async fn listing_transaction_is_a_read_only_snapshot() -> anyhow::Result<()> {
        let Ok(url) = std::env::var("SOUL_TEST_POSTGRES_URL") else {
            return Ok(());
        };
        let mut conn = PgConnection::establish(&url).await?;

        let (isolation, read_only) = read_snapshot(&mut conn, |conn| {
            async move {
                let isolation = setting(conn, "transaction_isolation").await?;
                let read_only = setting(conn, "transaction_read_only").await?;
                Ok::<_, PgError>((isolation, read_only))
            }
            .scope_boxed()
        })
        .await?;

        assert_eq!(isolation, "repeatable read");
        assert_eq!(read_only, "on");

        Ok(())
    }
}
