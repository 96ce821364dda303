use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use soul_core::{PageRequest, PaginationError};
use uuid::Uuid;

use super::{BackendKind, DiaryBackend};
use crate::model::{Options, Sense, SenseEntry, SenseList, SenseRecord};
use crate::{BackendError, Result, TRACING_TARGET_BACKEND};

/// Default timeout for requests to the diary server: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings of a [`SoulBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoulConfig {
    /// Base URL of the diary server, e.g. `http://localhost:8001`.
    pub url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl SoulConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("soul-diary/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the timeout, falling back to the default when zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SenseBody {
    data: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SenseResponse {
    id: Uuid,
    data: String,
    created_at: Timestamp,
}

impl SenseResponse {
    fn into_sense(self) -> Result<Sense> {
        Sense::from_record(SenseRecord {
            id: self.id,
            data: self.data,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SensesPageResponse {
    data: Vec<SenseResponse>,
    limit: i64,
    total_items: i64,
    previous: Option<String>,
    next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    /// Machine-readable error name, e.g. `invalid_cursor`.
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    resource: Option<String>,
}

/// The operation a response belongs to, used to pick the error for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    SignIn,
    Other,
}

/// Maps an unsuccessful response to a [`BackendError`].
fn map_error(call: Call, status: StatusCode, body: ErrorBody) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED if call == Call::SignIn => BackendError::IncorrectCredentials,
        StatusCode::UNAUTHORIZED => BackendError::NonAuthenticated,
        StatusCode::FORBIDDEN => BackendError::Forbidden,
        StatusCode::NOT_FOUND => BackendError::SenseNotFound,
        StatusCode::CONFLICT => BackendError::UserAlreadyExists,
        StatusCode::BAD_REQUEST => match body.name.as_str() {
            "registration_disabled" => BackendError::RegistrationNotSupported,
            "invalid_cursor" => {
                BackendError::Pagination(PaginationError::InvalidCursor("rejected by the server"))
            }
            "invalid_limit" => BackendError::Pagination(PaginationError::InvalidLimit(0)),
            _ => BackendError::Rejected {
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: body.message,
            },
        },
        status => BackendError::Rejected {
            status: status.as_u16(),
            message: body.message,
        },
    }
}

struct SoulBackendInner {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for SoulBackendInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoulBackendInner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct RemoteSession {
    username: String,
    token: String,
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Diary kept on a Soul Diary server.
///
/// Sense entries are serialized on this side; the server only ever sees the
/// opaque `data` string.
#[derive(Debug, Clone)]
pub struct SoulBackend {
    inner: Arc<SoulBackendInner>,
    session: Option<RemoteSession>,
}

impl SoulBackend {
    /// Creates a backend for the server at `config.url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SoulConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_BACKEND,
            url = %config.url,
            timeout_ms = config.effective_timeout().as_millis(),
            "Creating diary server client"
        );

        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(&config.user_agent)
            .build()?;

        let inner = SoulBackendInner {
            http,
            base_url: config.url.trim_end_matches('/').to_owned(),
        };

        Ok(Self {
            inner: Arc::new(inner),
            session: None,
        })
    }

    /// Reuses a token obtained earlier.
    pub fn with_session(mut self, username: impl Into<String>, token: impl Into<String>) -> Self {
        self.session = Some(RemoteSession {
            username: username.into(),
            token: token.into(),
        });
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        let builder = self.inner.http.request(method, url);

        match &self.session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        if self.session.is_none() {
            return Err(BackendError::NonAuthenticated);
        }

        Ok(self.request(method, path))
    }

    async fn send(call: Call, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        tracing::debug!(
            target: TRACING_TARGET_BACKEND,
            status = status.as_u16(),
            name = %body.name,
            message = %body.message,
            resource = ?body.resource,
            "Diary server rejected the request"
        );

        Err(map_error(call, status, body))
    }

    async fn send_json<T: DeserializeOwned>(call: Call, builder: RequestBuilder) -> Result<T> {
        Ok(Self::send(call, builder).await?.json().await?)
    }

    async fn open_session(
        &mut self,
        call: Call,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<String> {
        let builder = self
            .request(Method::POST, path)
            .json(&CredentialsBody { username, password });
        let TokenBody { token } = Self::send_json(call, builder).await?;

        self.session = Some(RemoteSession {
            username: username.to_owned(),
            token: token.clone(),
        });
        Ok(token)
    }
}

#[async_trait]
impl DiaryBackend for SoulBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Soul
    }

    fn session(&self) -> Option<(&str, &str)> {
        self.session
            .as_ref()
            .map(|session| (session.username.as_str(), session.token.as_str()))
    }

    async fn options(&self) -> Result<Options> {
        Self::send_json(Call::Other, self.request(Method::GET, "/options")).await
    }

    async fn create_user(&mut self, username: &str, password: &str) -> Result<String> {
        self.open_session(Call::Other, "/signup", username, password)
            .await
    }

    async fn auth(&mut self, username: &str, password: &str) -> Result<String> {
        self.open_session(Call::SignIn, "/signin", username, password)
            .await
    }

    async fn logout(&mut self) -> Result<()> {
        let Ok(builder) = self.authed(Method::POST, "/logout") else {
            return Ok(());
        };

        let result = Self::send(Call::Other, builder).await;
        self.session = None;

        match result {
            Ok(_) | Err(BackendError::NonAuthenticated) => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn get_senses(&self, cursor: Option<&str>, limit: i64) -> Result<SenseList> {
        let request = PageRequest::new(cursor, limit)?;

        let mut query = vec![("limit", request.limit().to_string())];
        if let Some(cursor) = request.cursor() {
            query.push(("cursor", cursor.encode()));
        }

        let builder = self.authed(Method::GET, "/senses/")?.query(&query);
        let page: SensesPageResponse = Self::send_json(Call::Other, builder)
            .await
            .map_err(|error| match error {
                BackendError::Pagination(PaginationError::InvalidLimit(_)) => {
                    BackendError::Pagination(PaginationError::InvalidLimit(limit))
                }
                error => error,
            })?;

        Ok(SenseList {
            data: page
                .data
                .into_iter()
                .map(SenseResponse::into_sense)
                .collect::<Result<_>>()?,
            limit: page.limit,
            total_items: page.total_items,
            previous: page.previous,
            next: page.next,
        })
    }

    async fn get_sense(&self, sense_id: Uuid) -> Result<Sense> {
        let builder = self.authed(Method::GET, &format!("/senses/{sense_id}"))?;
        Self::send_json::<SenseResponse>(Call::Other, builder)
            .await?
            .into_sense()
    }

    async fn create_sense(&self, entry: &SenseEntry) -> Result<Sense> {
        let builder = self
            .authed(Method::POST, "/senses/")?
            .json(&SenseBody {
                data: entry.to_data()?,
            });
        Self::send_json::<SenseResponse>(Call::Other, builder)
            .await?
            .into_sense()
    }

    async fn update_sense(&self, sense_id: Uuid, entry: &SenseEntry) -> Result<Sense> {
        let builder = self
            .authed(Method::POST, &format!("/senses/{sense_id}"))?
            .json(&SenseBody {
                data: entry.to_data()?,
            });
        Self::send_json::<SenseResponse>(Call::Other, builder)
            .await?
            .into_sense()
    }

    async fn delete_sense(&self, sense_id: Uuid) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/senses/{sense_id}"))?;
        Self::send(Call::Other, builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    use super::*;
    use crate::model::Emotion;

    fn body(name: &str, message: &str, resource: Option<&str>) -> ErrorBody {
        ErrorBody {
            name: name.to_owned(),
            message: message.to_owned(),
            resource: resource.map(str::to_owned),
        }
    }

    async fn spawn(app: Router) -> anyhow::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}"))
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    fn entry() -> SenseEntry {
        SenseEntry {
            emotions: vec![Emotion::Calmness],
            feelings: "quiet".to_owned(),
            body: "loose shoulders".to_owned(),
            desires: "a walk".to_owned(),
        }
    }

    #[test]
    fn unauthorized_depends_on_call() {
        let error = map_error(Call::SignIn, StatusCode::UNAUTHORIZED, ErrorBody::default());
        assert!(matches!(error, BackendError::IncorrectCredentials));

        let error = map_error(Call::Other, StatusCode::UNAUTHORIZED, ErrorBody::default());
        assert!(matches!(error, BackendError::NonAuthenticated));
    }

    #[test]
    fn status_mapping() {
        let error = map_error(Call::Other, StatusCode::FORBIDDEN, ErrorBody::default());
        assert!(matches!(error, BackendError::Forbidden));

        let error = map_error(Call::Other, StatusCode::NOT_FOUND, ErrorBody::default());
        assert!(matches!(error, BackendError::SenseNotFound));

        let error = map_error(Call::Other, StatusCode::CONFLICT, ErrorBody::default());
        assert!(matches!(error, BackendError::UserAlreadyExists));

        let error = map_error(
            Call::Other,
            StatusCode::INTERNAL_SERVER_ERROR,
            body("internal_server_error", "Internal server error.", None),
        );
        assert!(matches!(error, BackendError::Rejected { status: 500, .. }));
    }

    #[test]
    fn bad_request_variants() {
        let error = map_error(
            Call::Other,
            StatusCode::BAD_REQUEST,
            body(
                "registration_disabled",
                "Registration is disabled.",
                Some("account"),
            ),
        );
        assert!(matches!(error, BackendError::RegistrationNotSupported));

        let error = map_error(
            Call::Other,
            StatusCode::BAD_REQUEST,
            body("invalid_cursor", "Invalid cursor.", Some("pagination")),
        );
        assert!(matches!(
            error,
            BackendError::Pagination(PaginationError::InvalidCursor(_))
        ));

        let error = map_error(
            Call::Other,
            StatusCode::BAD_REQUEST,
            body(
                "invalid_limit",
                "Invalid page size. Limit may not exceed 100",
                Some("pagination"),
            ),
        );
        assert!(matches!(
            error,
            BackendError::Pagination(PaginationError::InvalidLimit(_))
        ));

        let error = map_error(
            Call::Other,
            StatusCode::BAD_REQUEST,
            body(
                "bad_request",
                "Field 'username' must be between 3 and 32 characters long",
                None,
            ),
        );
        assert!(matches!(error, BackendError::Rejected { status: 400, .. }));
    }

    #[test]
    fn messages_do_not_pick_the_error() {
        let error = map_error(
            Call::Other,
            StatusCode::BAD_REQUEST,
            body(
                "bad_request",
                "Invalid request data. Registration is disabled",
                Some("pagination"),
            ),
        );
        assert!(matches!(error, BackendError::Rejected { status: 400, .. }));
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = SoulConfig::new("http://localhost:8001").with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("soul-diary/"));
    }

    #[tokio::test]
    async fn senses_need_a_session() -> anyhow::Result<()> {
        let backend = SoulBackend::new(SoulConfig::new("http://127.0.0.1:1"))?;

        let error = backend.get_senses(None, 10).await.unwrap_err();
        assert!(matches!(error, BackendError::NonAuthenticated));

        let error = backend.get_sense(Uuid::nil()).await.unwrap_err();
        assert!(matches!(error, BackendError::NonAuthenticated));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_limit_is_caught_before_sending() -> anyhow::Result<()> {
        let backend =
            SoulBackend::new(SoulConfig::new("http://127.0.0.1:1"))?.with_session("diarist", "t");

        let error = backend.get_senses(None, 0).await.unwrap_err();
        assert!(matches!(
            error,
            BackendError::Pagination(PaginationError::InvalidLimit(0))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn limit_over_server_cap_is_invalid_limit() -> anyhow::Result<()> {
        let app = Router::new().route(
            "/senses/",
            get(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    axum::Json(json!({
                        "name": "invalid_limit",
                        "message": "Invalid page size. Limit may not exceed 100",
                        "resource": "pagination",
                    })),
                )
            }),
        );
        let url = spawn(app).await?;

        let backend = SoulBackend::new(SoulConfig::new(url))?.with_session("diarist", "abc");
        let error = backend.get_senses(None, 150).await.unwrap_err();
        assert!(matches!(
            error,
            BackendError::Pagination(PaginationError::InvalidLimit(150))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn signin_and_list_against_server() -> anyhow::Result<()> {
        let data = serde_json::to_string(&entry())?;
        let page = json!({
            "data": [{
                "id": Uuid::nil(),
                "data": data,
                "created_at": "2024-05-01T10:00:00Z",
            }],
            "limit": 5,
            "total_items": 1,
            "previous": null,
            "next": null,
        });

        let app = Router::new()
            .route(
                "/signin",
                post(|axum::Json(body): axum::Json<Value>| async move {
                    if body["password"] == "password123" {
                        (axum::http::StatusCode::OK, axum::Json(json!({ "token": "abc" })))
                    } else {
                        (
                            axum::http::StatusCode::UNAUTHORIZED,
                            axum::Json(json!({ "name": "unauthorized", "message": "Invalid credentials." })),
                        )
                    }
                }),
            )
            .route(
                "/senses/",
                get(
                    move |headers: HeaderMap, Query(query): Query<Value>| async move {
                        if bearer(&headers) != Some("abc") || query["limit"] != "5" {
                            return (axum::http::StatusCode::UNAUTHORIZED, axum::Json(json!({})));
                        }
                        (axum::http::StatusCode::OK, axum::Json(page))
                    },
                ),
            );
        let url = spawn(app).await?;

        let mut backend = SoulBackend::new(SoulConfig::new(url))?;

        let error = backend.auth("diarist", "wrong").await.unwrap_err();
        assert!(matches!(error, BackendError::IncorrectCredentials));

        let token = backend.auth("diarist", "password123").await?;
        assert_eq!(token, "abc");
        assert_eq!(backend.session(), Some(("diarist", "abc")));

        let list = backend.get_senses(None, 5).await?;
        assert_eq!(list.total_items, 1);
        assert_eq!(list.data[0].entry, entry());
        assert!(list.next.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn server_errors_surface_as_backend_errors() -> anyhow::Result<()> {
        let app = Router::new()
            .route(
                "/signup",
                post(|| async {
                    (
                        axum::http::StatusCode::CONFLICT,
                        axum::Json(json!({ "name": "conflict", "message": "Resource state conflict." })),
                    )
                }),
            )
            .route(
                "/senses/{id}",
                get(|| async {
                    (
                        axum::http::StatusCode::FORBIDDEN,
                        axum::Json(json!({ "name": "forbidden", "message": "Access denied." })),
                    )
                }),
            );
        let url = spawn(app).await?;

        let mut backend = SoulBackend::new(SoulConfig::new(&url))?;
        let error = backend
            .create_user("diarist", "password123")
            .await
            .unwrap_err();
        assert!(matches!(error, BackendError::UserAlreadyExists));

        let backend = SoulBackend::new(SoulConfig::new(url))?.with_session("diarist", "abc");
        let error = backend.get_sense(Uuid::nil()).await.unwrap_err();
        assert!(matches!(error, BackendError::Forbidden));

        Ok(())
    }
}
