use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// [`axum::extract::Query`] with rejections rendered as [`Error`].
///
/// ```rust,no_run
/// use soul_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Listing {
///     cursor: Option<String>,
///     limit: Option<i64>,
/// }
///
/// async fn list(Query(params): Query<Listing>) {
///     let _ = (params.cursor, params.limit);
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: crate::TRACING_TARGET_EXTRACT,
        error = %rejection,
        "query string rejected"
    );

    let message = rejection.body_text();
    match extract_field_name(&message) {
        Some(field) if message.contains("invalid") => ErrorKind::BadRequest
            .with_message(format!("Invalid value for query parameter '{field}'"))
            .with_context(sanitize_error_message(&message)),
        _ => ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context(sanitize_error_message(&message)),
    }
}

/// Best-effort lookup of the offending field in a serde error message.
fn extract_field_name(message: &str) -> Option<&str> {
    let start = message.find('`')?;
    let rest = &message[start + 1..];
    let end = rest.find('`')?;
    Some(&rest[..end])
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_between_backticks() {
        assert_eq!(
            extract_field_name("invalid digit found in `limit`"),
            Some("limit")
        );
        assert_eq!(extract_field_name("no field here"), None);
    }
}
