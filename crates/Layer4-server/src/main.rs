//! BookForge server - Main entry point

mod routes;

use anyhow::Context;
use bookforge_engine::Orchestrator;
use bookforge_foundation::{AuthGate, BookForgeConfig, JsonStore, TokenStore};
use bookforge_provider::CodexProvider;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// BookForge - turn a topic into a multi-format ebook
#[derive(Parser, Debug)]
#[command(name = "bookforge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    listen: SocketAddr,

    /// Data directory (config.json, token_data.json, output/)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Remove finished tasks older than this many minutes
    #[arg(long)]
    retention_mins: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// How often the retention sweep runs
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = match args.data_dir {
        Some(dir) => JsonStore::new(dir),
        None => JsonStore::global().context("cannot locate the data directory")?,
    };
    std::fs::create_dir_all(store.base_dir())
        .with_context(|| format!("cannot create {}", store.base_dir().display()))?;

    let config = BookForgeConfig::load(&store);
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.resolve_output_dir(&store));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let tokens = TokenStore::new(store.clone());
    let auth: Arc<dyn AuthGate> = Arc::new(tokens.clone());
    let service = Arc::new(CodexProvider::new(config.api_url.clone(), Arc::clone(&auth)));

    info!(
        "Data dir: {}, output dir: {}, model: {}",
        store.base_dir().display(),
        output_dir.display(),
        config.model
    );

    let orchestrator = Orchestrator::builder(service, auth)
        .config(config)
        .config_store(store)
        .output_dir(output_dir)
        .build();

    if let Some(mins) = args.retention_mins {
        let retention = Duration::from_secs(mins.saturating_mul(60));
        let orchestrator = orchestrator.clone();
        info!("Finished tasks are kept for {} minute(s)", mins);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                orchestrator.cleanup_older_than(retention);
            }
        });
    }

    let app = routes::router(routes::AppState::new(orchestrator, tokens));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("cannot bind {}", args.listen))?;
    info!("BookForge listening on http://{}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
