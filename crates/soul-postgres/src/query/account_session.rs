//! Account session repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{AccountSession, NewAccountSession};
use crate::{PgConnection, PgError, PgResult, schema};

/// Bearer session storage.
pub trait AccountSessionRepository {
    /// Stores a newly issued session.
    fn create_session(
        &mut self,
        new_session: NewAccountSession,
    ) -> impl Future<Output = PgResult<AccountSession>> + Send;

    /// Finds the session owning a token.
    fn find_session_by_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = PgResult<Option<AccountSession>>> + Send;

    /// Deletes a single session. Returns false if it did not exist.
    fn delete_session(&mut self, token: &str) -> impl Future<Output = PgResult<bool>> + Send;

    /// Deletes every session of an account and returns how many were removed.
    fn delete_account_sessions(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;
}

impl AccountSessionRepository for PgConnection {
    async fn create_session(&mut self, new_session: NewAccountSession) -> PgResult<AccountSession> {
        use schema::account_sessions;

        diesel::insert_into(account_sessions::table)
            .values(&new_session)
            .returning(AccountSession::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_session_by_token(&mut self, token: &str) -> PgResult<Option<AccountSession>> {
        use schema::account_sessions::{self, dsl};

        account_sessions::table
            .filter(dsl::token.eq(token))
            .select(AccountSession::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_session(&mut self, token: &str) -> PgResult<bool> {
        use schema::account_sessions::{self, dsl};

        let deleted = diesel::delete(account_sessions::table.filter(dsl::token.eq(token)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn delete_account_sessions(&mut self, account_id: Uuid) -> PgResult<usize> {
        use schema::account_sessions::{self, dsl};

        diesel::delete(account_sessions::table.filter(dsl::account_id.eq(account_id)))
            .execute(self)
            .await
            .map_err(PgError::from)
    }
}
