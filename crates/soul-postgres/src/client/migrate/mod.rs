//! Embedded schema migrations.

mod runner;
mod status;

pub use status::{MigrationResult, MigrationStatus};

use crate::{PgClient, PgResult};

/// Migration operations available on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending migration. Safe to call repeatedly.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Compares applied migrations against the embedded set.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        let conn = self.get_connection().await?;
        runner::run_pending_migrations(conn).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        runner::get_migration_status(&mut conn).await
    }
}
