use anyhow::{Context, Result};
use clap::Parser;
use rusty_videos::{api, config, logging, videos};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the in-memory video catalog over HTTP.
#[derive(Debug, Parser)]
#[command(name = "rusty-videos", version, about)]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// Start with the sample fixture record (overrides `VIDEOS_SEED_FIXTURE`).
    #[arg(long)]
    seed_fixture: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing();

    let store = if cli.seed_fixture || config.seed_fixture {
        tracing::info!("Seeding store with fixture video");
        videos::InMemoryVideoStore::with_records(vec![videos::sample_video()])
    } else {
        videos::InMemoryVideoStore::new()
    };
    let app = api::create_router(Arc::new(store));

    let port = cli.port.unwrap_or(config.server_port);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}
