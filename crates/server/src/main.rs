use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use chairside_archive_memory::MemoryArchiveLog;
use chairside_server::api::{AppState, router};
use chairside_server::config::ChairsideConfig;
use chairside_server::seed;
use chairside_server::session::StaticSessionValidator;
use chairside_store_memory::{MemoryImageStore, MemoryPolicyStore, MemoryWireStore};

/// Chairside records HTTP server.
#[derive(Parser, Debug)]
#[command(name = "chairside-server", about = "HTTP server for the Chairside records API")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "chairside.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Load development seed data on startup.
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from the TOML file, or use defaults if the file
    // does not exist.
    let config: ChairsideConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    let mut validator = StaticSessionValidator::new();
    for session in &config.session.static_sessions {
        validator = validator.with_token(
            &session.token,
            &session.user_id,
            session.display_name.as_deref().unwrap_or(&session.user_id),
        );
    }
    if config.session.static_sessions.is_empty() {
        tracing::warn!("no sessions configured; all requests will be rejected with NO_SESSION");
    }

    let state = AppState {
        images: Arc::new(MemoryImageStore::new()),
        policies: Arc::new(MemoryPolicyStore::new()),
        wires: Arc::new(MemoryWireStore::new()),
        archive: Arc::new(MemoryArchiveLog::new()),
        sessions: Arc::new(validator),
    };

    if cli.seed {
        seed::seed(&state).await.map_err(|e| e.to_string())?;
    }

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "chairside server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
