//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # OpenAPI paths, request timeout
//! └── service: ServiceConfig        # Postgres, registration, migrations
//! ```
//!
//! Every option can be given as an argument or an environment variable.
//!
//! ```bash
//! soul-diary --postgres-url "postgresql://..." --port 8001
//! POSTGRES_URL="postgresql://..." REGISTRATION_ENABLED=false soul-diary
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use soul_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "soul-diary")]
#[command(about = "Soul Diary API server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Database and account configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads `.env` (if enabled) and parses the arguments.
    ///
    /// The file is loaded first so clap picks its values up as environment
    /// defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, `info` by default.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .context("failed to create env filter")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .context("failed to initialize tracing")?;

        Ok(())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .postgres
            .validate()
            .context("invalid database configuration")?;
        Ok(())
    }

    /// Logs the configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_max_connections = self.service.postgres.postgres_max_connections,
            postgres_connection_timeout_secs = ?self.service.postgres.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?self.service.postgres.postgres_idle_timeout_secs,
            registration_enabled = self.service.registration_enabled,
            run_migrations = self.service.run_migrations,
            "Service configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["soul-diary"])?;

        assert_eq!(cli.server.port, 8001);
        assert_eq!(cli.middleware.request_timeout, 30);
        assert!(cli.service.registration_enabled);
        assert!(cli.validate().is_ok());

        Ok(())
    }

    #[test]
    fn parses_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "soul-diary",
            "--port",
            "9000",
            "--registration-enabled",
            "false",
            "--postgres-url",
            "postgresql://soul:soul@db:5432/soul",
        ])?;

        assert_eq!(cli.server.port, 9000);
        assert!(!cli.service.registration_enabled);
        assert_eq!(
            cli.service.postgres.postgres_url,
            "postgresql://soul:soul@db:5432/soul"
        );

        Ok(())
    }

    #[test]
    fn invalid_values_fail_validation() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["soul-diary", "--request-timeout", "0"])?;
        assert!(cli.validate().is_err());
        Ok(())
    }
}
