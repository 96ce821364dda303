use std::time::Instant;

use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::PoolableConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel::migration::MigrationSource;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, MigrationStatus};
use crate::{MIGRATIONS, PgConn, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION};

/// Applies pending migrations on a blocking thread.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub(super) async fn run_pending_migrations(mut conn: PgConn) -> PgResult<MigrationResult> {
    let start = Instant::now();
    let status = get_migration_status(&mut conn).await?;

    if status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_versions.len(),
            "Database schema is up to date"
        );
        return Ok(MigrationResult::new(start.elapsed(), Vec::new()));
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = status.pending_migrations(),
        "Applying pending migrations"
    );

    if conn.is_broken() {
        return Err(PgError::Migration(
            "connection is broken before migrations".into(),
        ));
    }

    let mut wrapper: AsyncConnectionWrapper<PooledConnection> = conn.into_inner().into();
    let versions = spawn_blocking(move || {
        wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>())
    })
    .await
    .map_err(|err| PgError::Migration(err.into()))?
    .map_err(PgError::Migration)?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?start.elapsed(),
        applied = versions.len(),
        "Migrations applied"
    );

    Ok(MigrationResult::new(start.elapsed(), versions))
}

/// Compares the versions recorded in the database with the embedded ones.
pub(super) async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let applied = get_applied_migrations(conn).await?;
    let embedded = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;

    let pending = embedded
        .iter()
        .map(|migration| migration.name().version().to_string())
        .filter(|version| !applied.contains(version))
        .collect();

    Ok(MigrationStatus::new(applied, pending))
}

async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct ExistsRow {
        #[diesel(sql_type = diesel::sql_types::Bool)]
        exists: bool,
    }

    #[derive(diesel::QueryableByName)]
    struct VersionRow {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let initialized = diesel::sql_query(
        "SELECT EXISTS (SELECT FROM information_schema.tables \
         WHERE table_name = '__diesel_schema_migrations') AS exists",
    )
    .get_result::<ExistsRow>(conn)
    .await?
    .exists;

    if !initialized {
        return Ok(Vec::new());
    }

    let versions = diesel::sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<VersionRow>(conn)
        .await?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}
