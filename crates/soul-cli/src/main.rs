#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use soul_server::handler::routes;
use soul_server::middleware::{RouterExt, RouterOpenApiExt};
use soul_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};
use crate::server::ServerError;

pub const TRACING_TARGET_SERVER_STARTUP: &str = "soul_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "soul_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "soul_cli::config";

/// Process exit codes for start-up and runtime failures.
mod exit_code {
    pub const UNKNOWN: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const DATABASE: i32 = 3;
}

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(exit_code_of(&error));
}

/// Maps an error to the exit code documented in the README.
fn exit_code_of(error: &anyhow::Error) -> i32 {
    if let Some(error) = error.downcast_ref::<ServerError>() {
        return error.exit_code();
    }

    match error.downcast_ref::<soul_server::Error>().map(|e| e.kind()) {
        Some(soul_server::ErrorKind::Config) => exit_code::CONFIG,
        Some(soul_server::ErrorKind::External) => exit_code::DATABASE,
        Some(_) => exit_code::UNKNOWN,
        None if error.downcast_ref::<ConfigError>().is_some() => exit_code::CONFIG,
        None => exit_code::UNKNOWN,
    }
}

/// Marks configuration failures detected before any service starts.
#[derive(Debug, thiserror::Error)]
#[error("{0:#}")]
struct ConfigError(anyhow::Error);

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing()?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting soul diary server"
    );

    cli.validate().map_err(ConfigError)?;
    cli.log();

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Builds the application router.
///
/// Layers added last run first: error handling wraps observability, which
/// wraps the routes and the OpenAPI document.
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes()
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_observability_layer()
        .with_error_handling_layer(middleware.request_timeout())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn exit_codes_by_failure() {
        let config = anyhow::Error::new(ConfigError(anyhow::anyhow!("bad port")));
        assert_eq!(exit_code_of(&config), exit_code::CONFIG);

        let database = anyhow::Error::new(soul_server::Error::external("postgres", "refused"))
            .context("failed to create service state");
        assert_eq!(exit_code_of(&database), exit_code::DATABASE);

        let bind = anyhow::Error::new(ServerError::bind("127.0.0.1:8001", io::Error::other("x")));
        assert_eq!(exit_code_of(&bind), 4);

        assert_eq!(exit_code_of(&anyhow::anyhow!("other")), exit_code::UNKNOWN);
    }
}
