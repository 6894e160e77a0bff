//! mboard-proxy - upstream adapter service
//!
//! Default port 5730. Credentials come from the environment or the
//! `[credentials]` table of `proxy.toml`; adapters whose credential is missing
//! still start and report "not configured" per request.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

use mboard_common::config::{load_toml_config, resolve_config_path};
use mboard_proxy::config::{ProxyToml, DEFAULT_PORT};
use mboard_proxy::{build_router, AppState, ProxyConfig};

/// Command-line arguments for mboard-proxy
#[derive(Parser, Debug)]
#[command(name = "mboard-proxy")]
#[command(about = "Third-party music API adapters for Musicboard")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "MBOARD_PROXY_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "MBOARD_PROXY_HOST")]
    host: String,

    /// Path to proxy.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config before tracing so the file can set the level; load_toml_config's
    // own log lines are dropped until the subscriber is installed.
    let config_path = resolve_config_path(args.config.as_deref(), "proxy");
    let toml: ProxyToml = load_toml_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml.logging.level.as_str().into()),
        )
        .init();

    info!(
        "Starting Musicboard proxy (mboard-proxy) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using compiled defaults"),
    }

    let config = ProxyConfig::resolve(&toml);
    let state = AppState::new(&config).context("Failed to build upstream clients")?;
    let app = build_router(state);

    let port = args.port.or(toml.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", args.host, port)
        .parse()
        .context("Invalid listen address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
