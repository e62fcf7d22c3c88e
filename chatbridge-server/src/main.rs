use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use chatbridge_server::{router, AppState, ServerConfig};

/// Chat backend streaming Ollama and gateway models over HTTP.
///
/// Providers and feature flags come from the environment: OLLAMA_BASE_URL,
/// OLLAMA_API_KEY, AI_GATEWAY_API_KEY, AI_GATEWAY_BASE_URL,
/// FEATURE_TWO_FACTOR_AUTH, FEATURE_GUEST_ACCOUNTS.
#[derive(Debug, Parser)]
#[command(name = "chatbridge-server", version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "CHATBRIDGE_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "chatbridge=info")]
    log: String,
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(?config, "loaded configuration");
    let state = AppState::from_config(config)?;
    let shutdown = state.shutdown.clone();

    let listener = TcpListener::bind(cli.bind).await?;
    tracing::info!(addr = %cli.bind, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}
