mod config;
mod logging;
mod routes;
mod view;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use dexview_core::{
    Aggregator, Pager, PokeApiClient, QueryClient, QueryConfig, Spotlight, UniformIdSource,
};

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load("config.toml")?;

    let _logging_guard = logging::init_logging(&config.log_dir, &config.log_level);

    info!("Dexview starting...");
    info!("Upstream catalog API: {}", config.api_base);

    let fetcher = PokeApiClient::new(config.api_base.as_str())
        .map_err(|e| anyhow::anyhow!("Failed to build API client: {}", e))?;
    let query_config = QueryConfig {
        stale_after: Duration::from_secs(config.stale_secs),
        retry_attempts: config.retry_attempts,
        ..QueryConfig::default()
    };
    let query = QueryClient::new(Aggregator::new(Arc::new(fetcher)), query_config);
    let pager = Pager::new(query.clone(), config.page_size);
    let spotlight = Spotlight::new(Arc::new(UniformIdSource::default()));

    let state = Arc::new(AppState {
        query,
        pager,
        spotlight,
    });
    let app = routes::router(state);

    let addr: SocketAddr = config.server_address().parse()?;
    info!("Serving the viewer on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
