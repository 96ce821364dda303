//! OpenAPI document generation and the Scalar UI, built with [`aide`].
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use soul_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default());
//! ```
//!
//! [`aide`]: https://docs.rs/aide

use aide::axum::ApiRouter;
use aide::openapi::{Info, License, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Paths the OpenAPI document and the Scalar UI are served on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON document.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_JSON_PATH", default_value = "/api/openapi.json")
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = "/api/scalar")
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: "/api/openapi.json".to_owned(),
            scalar_ui: "/api/scalar".to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] that serves the generated document.
pub trait RouterOpenApiExt<S> {
    /// Serves the document with the default Soul Diary [`Info`].
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Serves the document with custom [`Info`].
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "Soul Diary API".to_owned(),
            summary: Some("Personal diary of senses".to_owned()),
            description: Some(
                "Accounts, sessions and senses of the Soul Diary. Sense listings are \
                 paginated newest first with opaque cursors."
                    .to_owned(),
            ),
            license: Some(License {
                name: "MIT".to_owned(),
                identifier: Some("MIT".to_owned()),
                ..License::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use aide::axum::routing::get_with;
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn document_lists_routes() -> anyhow::Result<()> {
        let app: Router = ApiRouter::new()
            .api_route("/ping", get_with(
                || async { axum::Json(serde_json::json!({ "pong": true })) },
                |op| op.summary("Ping"),
            ))
            .with_open_api(OpenApiConfig::default());
        let server = TestServer::new(app)?;

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let document: serde_json::Value = response.json();
        assert_eq!(document["info"]["title"], "Soul Diary API");
        assert!(document["paths"]["/ping"].is_object());

        Ok(())
    }
}
