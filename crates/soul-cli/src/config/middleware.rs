//! Middleware configuration for the HTTP server.

use std::time::Duration;

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use soul_server::middleware::OpenApiConfig;

use crate::TRACING_TARGET_CONFIG;

/// OpenAPI paths and the request timeout.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Maximum time in seconds a request may take before it fails with 500.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,
}

impl MiddlewareConfig {
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.request_timeout == 0 || self.request_timeout > 300 {
            return Err(anyhow!(
                "Request timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
                self.request_timeout
            ));
        }

        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            request_timeout_secs = self.request_timeout,
            "Middleware configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(request_timeout: u64) -> MiddlewareConfig {
        MiddlewareConfig {
            openapi: OpenApiConfig::default(),
            request_timeout,
        }
    }

    #[test]
    fn request_timeout_bounds() {
        assert!(config(0).validate().is_err());
        assert!(config(301).validate().is_err());
        assert!(config(30).validate().is_ok());
        assert_eq!(config(30).request_timeout(), Duration::from_secs(30));
    }
}
