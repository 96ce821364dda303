use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// JSON body of every error response.
///
/// `context` and `status` are kept for logging and never serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Machine-readable error name.
    pub name: Cow<'a, str>,
    /// Message safe to show to the user.
    pub message: Cow<'a, str>,
    /// Resource the error relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const CONFLICT: Self =
        Self::new("conflict", "Resource state conflict.", StatusCode::CONFLICT);
    pub const FORBIDDEN: Self = Self::new("forbidden", "Access denied.", StatusCode::FORBIDDEN);
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const INVALID_CURSOR: Self = Self::new(
        "invalid_cursor",
        "Invalid cursor.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_LIMIT: Self = Self::new(
        "invalid_limit",
        "Invalid page size.",
        StatusCode::BAD_REQUEST,
    );
    pub const MALFORMED_AUTH_TOKEN: Self = Self::new(
        "malformed_auth_token",
        "Malformed auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_AUTH_TOKEN: Self = Self::new(
        "missing_auth_token",
        "Missing auth token.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    pub const REGISTRATION_DISABLED: Self = Self::new(
        "registration_disabled",
        "Registration is disabled.",
        StatusCode::BAD_REQUEST,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid credentials.",
        StatusCode::UNAUTHORIZED,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            status,
        }
    }

    /// Sets the resource, nesting it under an existing one as `outer/inner`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, resource)),
            None => resource,
        });
        self
    }

    /// Appends a sentence to the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{}. {}", base, message));
        self
    }

    /// Adds internal context, joined with `; ` when already present.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, context)),
            None => context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::warn!(
            status = %self.status,
            name = %self.name,
            message = %self.message,
            resource = ?self.resource,
            context = ?self.context,
            "HTTP error response"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_resources() {
        let response = ErrorResponse::NOT_FOUND
            .with_resource("account")
            .with_resource("sense");

        assert_eq!(response.resource.as_deref(), Some("account/sense"));
    }

    #[test]
    fn message_sentences_are_appended() {
        let response = ErrorResponse::BAD_REQUEST
            .with_message("Invalid cursor")
            .with_message("Request the first page again");

        assert_eq!(
            &response.message,
            "Invalid request data. Invalid cursor. Request the first page again"
        );
    }

    #[test]
    fn context_is_joined() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("pool exhausted")
            .with_context("waited 30s");

        assert_eq!(
            response.context.as_deref(),
            Some("pool exhausted; waited 30s")
        );
    }

    #[test]
    fn serialization_hides_internal_fields() {
        let response = ErrorResponse::FORBIDDEN
            .with_resource("sense")
            .with_context("owner mismatch");

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "forbidden");
        assert_eq!(json["resource"], "sense");
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
    }
}
