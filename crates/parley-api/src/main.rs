//! Parley CLI and JSON HTTP API entry point.
//!
//! Binary name: `parley`
//!
//! Resolves configuration (file, then `PARLEY_*` environment, then CLI
//! flags), initializes tracing and the database, then serves the API or
//! applies the schema.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use parley_infra::config::load_config;
use parley_types::config::AppConfig;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).await;
    apply_cli_overrides(&mut config, &cli);

    parley_observe::tracing_setup::init_tracing(&config.log)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let result = run(cli.command, config).await;
    parley_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } => {
            let state = AppState::init(&config).await?;

            let addr = config.server.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "parley listening");

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("server stopped");
        }

        Commands::Migrate { .. } => {
            AppState::init(&config).await?;
            tracing::info!(path = %config.sqlite.path, "schema is up to date");
        }
    }

    Ok(())
}

/// Flags given on the command line win over file and environment values.
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(filter) = cli.log_filter() {
        config.log.filter = filter.to_string();
    }

    match &cli.command {
        Commands::Serve { host, port, db } => {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(db) = db {
                config.sqlite.path = db.clone();
            }
        }
        Commands::Migrate { db } => {
            if let Some(db) = db {
                config.sqlite.path = db.clone();
            }
        }
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
