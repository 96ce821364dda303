//! Account registration, sign-in and logout.
//!
//! Successful signup and signin both open a new session and return its
//! bearer token.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use soul_postgres::PgClient;
use soul_postgres::model::{NewAccount, NewAccountSession};
use soul_postgres::query::{AccountRepository, AccountSessionRepository};
use uuid::Uuid;

use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::request::Credentials;
use crate::handler::response::{ErrorResponse, ServerOptions, SessionToken};
use crate::handler::{ErrorKind, Result};
use crate::service::{PasswordHasher, RegistrationPolicy, ServiceState, SessionTokenGenerator};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "soul_server::handler::authentication";

/// Opens a session for the account.
async fn open_session(
    conn: &mut soul_postgres::PgConn,
    session_tokens: SessionTokenGenerator,
    account_id: Uuid,
) -> Result<SessionToken> {
    let new_session = NewAccountSession {
        token: session_tokens.generate(),
        account_id,
    };

    let session = conn.create_session(new_session).await?;
    Ok(SessionToken::from_model(session))
}

/// Returns the server capabilities.
async fn options(
    State(registration): State<RegistrationPolicy>,
) -> Result<(StatusCode, Json<ServerOptions>)> {
    let response = ServerOptions {
        registration_enabled: registration.is_enabled(),
    };

    Ok((StatusCode::OK, Json(response)))
}

fn options_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get server options")
        .description("Reports whether new accounts may sign up.")
        .response::<200, Json<ServerOptions>>()
}

/// Registers an account and opens its first session.
#[tracing::instrument(skip_all)]
async fn signup(
    State(pg_client): State<PgClient>,
    State(registration): State<RegistrationPolicy>,
    State(password_hasher): State<PasswordHasher>,
    State(session_tokens): State<SessionTokenGenerator>,
    ValidateJson(request): ValidateJson<Credentials>,
) -> Result<(StatusCode, Json<SessionToken>)> {
    registration.ensure_enabled()?;

    let username = request.username().to_owned();
    tracing::debug!(target: TRACING_TARGET, username = %username, "Signing up");

    let mut conn = pg_client.get_connection().await?;
    if conn.username_exists(&username).await? {
        tracing::warn!(target: TRACING_TARGET, "Username is already taken");
        return Err(ErrorKind::Conflict
            .with_message("User already exists")
            .with_resource("account"));
    }

    let new_account = NewAccount {
        password_hash: password_hasher.hash_password(&request.password)?,
        username,
    };

    let account = conn.create_account(new_account).await?;
    let response = open_session(&mut conn, session_tokens, account.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "Account created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

fn signup_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Sign up")
        .description(
            "Creates an account and returns a session token. \
             Fails with 400 when registration is disabled.",
        )
        .response::<201, Json<SessionToken>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Verifies credentials and opens a session.
#[tracing::instrument(skip_all)]
async fn signin(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_tokens): State<SessionTokenGenerator>,
    ValidateJson(request): ValidateJson<Credentials>,
) -> Result<(StatusCode, Json<SessionToken>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(account) = conn.find_account_by_username(request.username()).await? else {
        password_hasher.verify_dummy_password(&request.password);
        tracing::warn!(target: TRACING_TARGET, "Sign-in with unknown username");

        return Err(ErrorKind::Unauthorized
            .with_message("Incorrect username or password")
            .with_resource("authentication"));
    };

    password_hasher.verify_password(&request.password, &account.password_hash)?;
    let response = open_session(&mut conn, session_tokens, account.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "Signed in"
    );

    Ok((StatusCode::OK, Json(response)))
}

fn signin_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Sign in")
        .description("Verifies the credentials and returns a new session token.")
        .response::<200, Json<SessionToken>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Closes the session the request was made with.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn logout(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    if !conn.delete_session(&auth_state.token).await? {
        tracing::debug!(target: TRACING_TARGET, "Session was already closed");
    }

    tracing::info!(target: TRACING_TARGET, "Logged out");

    Ok(StatusCode::NO_CONTENT)
}

fn logout_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Log out")
        .description("Invalidates the bearer token of the request.")
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns routes for authentication.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::{get_with, post_with};

    ApiRouter::new()
        .api_route("/options", get_with(options, options_docs))
        .api_route("/signup", post_with(signup, signup_docs))
        .api_route("/signin", post_with(signin, signin_docs))
        .api_route("/logout", post_with(logout, logout_docs))
        .with_path_items(|item| item.tag("Authentication"))
}
