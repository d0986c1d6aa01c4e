use anyhow::Result;
use clap::Parser;
use resort_core::config::SearchConfig;
use resort_core::seed::seed_if_empty;
use resort_core::store::Store;
use resort_server::routing::Catalog;
use resort_server::search::SearchClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Restaurant store directory
    #[arg(long, default_value = "./data")]
    data_dir: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store = Store::open(&args.data_dir)?;
    seed_if_empty(&store)?;

    let config = SearchConfig::from_env();
    tracing::info!(
        use_search = config.use_search,
        index = %config.index,
        "search backend configured"
    );
    let search = SearchClient::new(config.clone())?;
    let catalog = Arc::new(Catalog::new(store, search, config.use_search));

    let app = resort_server::build_app(catalog);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
