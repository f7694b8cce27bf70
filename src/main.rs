//! Demo service for request-scoped logging.
//!
//! ```text
//!  Client ──▶ correlation middleware ──▶ handler ──▶ upstream API
//!               │ resolve X-Request-ID      │ RequestLog / current_logger()
//!               │ bind request logger       ▼
//!               └──────────────────────▶ TracingSink ──▶ stdout
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use request_logger::config::{load_config, validate_config, watcher::ConfigWatcher, ConfigError};
use request_logger::lifecycle::signals::trigger_on_ctrl_c;
use request_logger::observability::{logging::init_tracing, metrics};
use request_logger::{HttpServer, ServiceConfig, Shutdown};

#[derive(Parser)]
#[command(name = "request-logger")]
#[command(about = "HTTP service with request-scoped structured logging", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override logging.level (DEBUG, INFO, WARN, ERROR).
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(level) = args.log_level {
        config.logging.level = level;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_tracing(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        subsystem = %config.logging.subsystem,
        level = %config.logging.level,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.with_current(&config.logging).run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        trigger_on_ctrl_c(&signal_shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
