use anyhow::Context;
use clap::Parser;
use mock_rest_server::config::{Config, StorageBackend};
use mock_rest_server::store::create_mock_store;
use mock_rest_server::{AppState, MockServer};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mock-rest-server", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, env = "MOCK_SERVER_HOST")]
    host: Option<String>,
    #[arg(short, long, env = "MOCK_SERVER_PORT")]
    port: Option<u16>,
    #[arg(long, value_enum, env = "MOCK_SERVER_STORAGE")]
    storage: Option<StorageBackend>,
    #[arg(long, env = "MOCK_SERVER_DB_PATH")]
    db_path: Option<PathBuf>,
    /// Header carrying the correlation id
    #[arg(long)]
    correlation_header: Option<String>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.storage {
            config.storage.backend = backend;
        }
        if let Some(path) = &self.db_path {
            config.storage.path = path.clone();
        }
        if let Some(header) = &self.correlation_header {
            config.dispatch.correlation_header = header.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?
        .next()
        .with_context(|| format!("No address found for {host}:{port}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;
    init_tracing(&config.log_level);

    info!(
        storage = config.storage.backend.as_str(),
        correlation_header = %config.dispatch.correlation_header,
        "Starting mock server"
    );

    let store = create_mock_store(&config.storage)?;
    let state = Arc::new(AppState::new(store, &config));
    state
        .lifecycle
        .restore()
        .await
        .context("Failed to restore mocks from store")?;

    let addr = resolve_addr(&config.server.host, config.server.port)?;
    let server = MockServer::new(addr, state);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!("Server stopped: {e:#}");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
