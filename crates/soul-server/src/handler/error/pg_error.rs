//! Database error to HTTP error conversion.

use soul_postgres::PgError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "soul_server::handler::postgres";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if error.is_unique_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = error.constraint(),
                error = %error,
                "unique constraint violation"
            );

            let conflict = ErrorKind::Conflict.with_message("Resource already exists");
            return match error.constraint() {
                Some("accounts_username_key") => conflict.with_resource("account"),
                Some(constraint) => conflict.with_context(constraint.to_owned()),
                None => conflict,
            };
        }

        if error.is_not_found() {
            tracing::debug!(target: TRACING_TARGET, "row not found");
            return ErrorKind::NotFound.into_error();
        }

        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout"
                );
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
            }
            PgError::Query(query_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use soul_postgres::error::{DieselError, TimeoutType};

    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let error: Error = PgError::Query(DieselError::NotFound).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn timeout_maps_to_500() {
        let error: Error = PgError::Timeout(TimeoutType::Wait).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn unexpected_maps_to_500() {
        let error: Error = PgError::Unexpected("pool closed".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
