//! CLI module for the Contact Book server
//!
//! Subcommands:
//! - `serve`: API plus the static web client (default)
//! - `api`: API server only
//! - `migrate`: apply pending schema migrations (or revert the latest) and exit

pub mod api;
pub mod migrate;
pub mod serve;

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Contact Book - multi-tenant contact management API
#[derive(Parser)]
#[command(name = "contact-book")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run API + web client on the same port (default mode)
    Serve,

    /// Run API server only
    Api,

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}

/// Read `.env`, load and validate configuration, start logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);
    config.validate()?;

    Ok(config)
}

pub(crate) fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["contact-book"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["contact-book", "migrate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Migrate(migrate::MigrateArgs { revert_last: false }))
        ));

        let cli = Cli::try_parse_from(["contact-book", "migrate", "--revert-last"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Migrate(migrate::MigrateArgs { revert_last: true }))
        ));

        let cli = Cli::try_parse_from(["contact-book", "api"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Api)));
    }

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 8080;

        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");

        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }
}
