use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionTokenGenerator;

/// Session token taken from the `Authorization` header.
///
/// Only the shape of the token is checked here. Use [`AuthState`] to make
/// sure the session exists.
///
/// [`AuthState`]: crate::extract::AuthState
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    token: String,
}

impl AuthHeader {
    /// Parses a raw bearer token.
    pub fn from_token(token: &str) -> Result<Self> {
        if !SessionTokenGenerator::is_well_formed(token) {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_length = token.len(),
                "bearer token has an unexpected shape"
            );

            return Err(ErrorKind::MalformedAuthToken
                .with_message("Session token must be 32 hexadecimal characters")
                .with_resource("authentication"));
        }

        Ok(Self {
            token: token.to_owned(),
        })
    }

    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[inline]
    pub fn into_token(self) -> String {
        self.token
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

        let bearer = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                    .with_message("Authentication required")
                    .with_resource("authentication"),
                _ => ErrorKind::MalformedAuthToken
                    .with_message("Authorization header must contain a Bearer token")
                    .with_resource("authentication"),
            })?;

        let auth_header = Self::from_token(bearer.token())?;
        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}

impl aide::OperationInput for AuthHeader {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_hex() {
        let header = AuthHeader::from_token("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(header.token(), "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn rejects_wrong_shapes() {
        for token in [
            "",
            "0123456789abcdef",
            "0123456789ABCDEF0123456789ABCDEF",
            "0123456789abcdef0123456789abcdeg",
        ] {
            let error = AuthHeader::from_token(token).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        }
    }
}
