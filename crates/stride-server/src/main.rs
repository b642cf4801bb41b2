//! stride-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `STRIDE_*` environment variables, opens the SQLite document store, and
//! serves the JSON API under `/api`.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use stride_api::AppState;
use stride_store_sqlite::SqliteStore;
use stride_upstream::{AnthropicClient, ClerkClient, Clients, StreamClient};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Stride coaching API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let clients = Clients {
    clerk:     ClerkClient::new(server_cfg.clerk())
      .context("failed to build Clerk client")?,
    stream:    StreamClient::new(server_cfg.stream())
      .context("failed to build Stream client")?,
    anthropic: AnthropicClient::new(server_cfg.anthropic())
      .context("failed to build Anthropic client")?,
  };

  let state = AppState {
    store:    Arc::new(store),
    upstream: Arc::new(clients),
    config:   Arc::new(server_cfg.api()),
  };

  let app = Router::new().nest("/api", stride_api::router(state));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
