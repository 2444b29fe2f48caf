//! Landing page server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Visitor ──GET /──▶ ┌──────────┐   ┌────────────┐
//!                        │  http    │──▶│  render    │──▶ homepage + blank form
//!     Visitor ──POST /─▶ │ handlers │   └────────────┘
//!                        └────┬─────┘
//!                             ▼
//!                      ┌─────────────┐   ┌───────────┐   ┌───────────────┐
//!                      │ LeadService │──▶│ form      │   │ recaptcha     │ (optional)
//!                      │             │──▶│ validator │   │ siteverify    │
//!                      └──────┬──────┘   └───────────┘   └───────────────┘
//!                             ▼
//!                      ┌─────────────┐
//!                      │ LeadStore   │  memory | sqlite
//!                      └─────────────┘
//!
//!     Anything else ──▶ 404 "Страница не найдена"
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lendpage::config;
use lendpage::lifecycle::{self, signals, Shutdown};
use lendpage::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lendpage")]
#[command(about = "Landing page with a contact form", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "LENDPAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init(&config.observability)?;

    tracing::info!("lendpage v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        recaptcha = config.recaptcha.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
            return Err(e.into());
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = lifecycle::build_server(config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;
    let listener = TcpListener::bind(&bind_address).await.map_err(|e| {
        tracing::error!(address = %bind_address, error = %e, "Failed to bind listener");
        e
    })?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
