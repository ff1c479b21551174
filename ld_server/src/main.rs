//! Liar's deck game server.
//!
//! Hosts a single table actor and exposes it over a WebSocket endpoint,
//! alongside a health check and static file serving.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Error};
use ld_server::{api, config::ServerConfig, logging, metrics};
use liars_deck::table::TableActor;
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run a liar's deck game server

USAGE:
  ld_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT    Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --static-dir  PATH       Directory of static assets  [default: env STATIC_DIR or ./public]
  --seed        N          Fixed shuffle seed          [default: env MATCH_SEED or random]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STATIC_DIR               Directory served for unmatched paths
  METRICS_BIND             Prometheus listener address (metrics disabled when unset)
  MATCH_STARTING_LIVES     Lives per player [default: 3]
  MATCH_MAX_PLAYERS        Seats at the table, 2 to 4 [default: 4]
  MATCH_SEED               Fixed shuffle seed
  TABLE_NAME               Table name reported by /health
  RUST_LOG                 Log filter [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    static_dir: Option<PathBuf>,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        static_dir: pargs.opt_value_from_str("--static-dir")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.static_dir, args.seed)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics at http://{addr}/metrics");
    }

    if !config.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist; only /ws and /health will respond",
            config.static_dir.display()
        );
    }

    let subscriber_buffer = config.table.subscriber_buffer;
    let table = TableActor::spawn(config.table.clone())?;
    info!(
        "Table '{}' ready: {} lives, up to {} players",
        config.table.name, config.table.settings.starting_lives, config.table.settings.max_players
    );

    let app = api::create_router(api::AppState::new(
        table.clone(),
        config.static_dir.clone(),
        subscriber_buffer,
    ));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    let _ = table.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {e}");
        std::future::pending::<()>().await;
    }
}
