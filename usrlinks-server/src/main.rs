//! # usrlinks server
//!
//! Checks whether a handle is registered across a few dozen platforms.
//! `GET /check/{handle}` runs a scan, `GET /fuzzy/{handle}` scans
//! look-alikes and `GET /status/{scan_id}` polls either.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use usrlinks_config::{ConfigLoad, ConfigLoader, ConfigSource};
use usrlinks_core::{EndpointRegistry, RegistrySource, ScanEngine};
use usrlinks_server::{AppState, create_router};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "usrlinks-server")]
#[command(about = "Username availability and profile reconnaissance service")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment file to load before reading configuration
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server host (overrides config and `USRLINKS_HOST`)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config and `USRLINKS_PORT`)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        source,
        env_file_loaded,
    } = loader.load().context("failed to load configuration")?;

    if env_file_loaded {
        info!("loaded .env file");
    }
    match &source {
        ConfigSource::Default => info!("using default configuration"),
        ConfigSource::Explicit(path)
        | ConfigSource::EnvPath(path)
        | ConfigSource::File(path) => {
            info!(path = %path.display(), "configuration loaded from file")
        }
        ConfigSource::EnvInline => {
            info!("configuration loaded from inline environment json")
        }
    }

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let (registry, registry_source) =
        EndpointRegistry::load_or_default(config.registry.path.as_deref());
    match &registry_source {
        RegistrySource::Fallback { reason, .. } => {
            warn!("custom platform registry rejected: {reason}")
        }
        other => info!(
            platforms = registry.len(),
            source = %other,
            "platform registry ready"
        ),
    }

    let engine = ScanEngine::with_http(registry, config.engine_config());
    let state = AppState::new(engine, registry_source);
    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("usrlinks server listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
