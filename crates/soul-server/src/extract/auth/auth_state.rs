use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use soul_postgres::PgClient;
use soul_postgres::query::AccountSessionRepository;
use uuid::Uuid;

use super::AuthHeader;
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};

/// An authenticated request.
///
/// Extraction fails with 401 unless the bearer token names an existing
/// session. The verified state is cached in the request extensions.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Account the session belongs to.
    pub account_id: Uuid,
    /// Session token the request was made with.
    pub token: String,
}

impl AuthState {
    /// Resolves a bearer token into its session.
    pub async fn from_unverified_header(
        auth_header: AuthHeader,
        pg_client: &PgClient,
    ) -> Result<Self> {
        let mut conn = pg_client.get_connection().await.map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "database connection failed during authentication"
            );
            ErrorKind::InternalServerError
                .with_message("Authentication is temporarily unavailable")
                .with_context(error.to_string())
        })?;

        let session = conn
            .find_session_by_token(auth_header.token())
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    "session token not found"
                );
                ErrorKind::Unauthorized
                    .with_message("Session is not valid")
                    .with_resource("authentication")
            })?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            account_id = %session.account_id,
            "session verified"
        );

        Ok(Self {
            account_id: session.account_id,
            token: session.token,
        })
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send + 'static,
    PgClient: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let auth_state = Self::from_unverified_header(auth_header, &pg_client).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}
