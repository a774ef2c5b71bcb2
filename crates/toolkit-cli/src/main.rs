#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod routes;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Cli;
use crate::routes::{AppState, routes};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "toolkit_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "toolkit_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "toolkit_cli::config";

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
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting toolkit server"
    );
    cli.log();
    cli.validate()?;

    let state = AppState::from_cli(&cli).context("failed to create application state")?;
    let router = create_router(state);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with request tracing applied.
fn create_router(state: AppState) -> Router {
    routes(state).layer(TraceLayer::new_for_http())
}
