use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcp_city_weather::storage::FileStorage;
use mcp_city_weather::{CityStore, CityWeather, Config, OpenMeteoClient, WeatherState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_city_weather=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting MCP city weather server");

    let config = Config::load()?;
    let storage = Arc::new(FileStorage::new(config.data_dir.clone()));
    tracing::info!("Saved cities live in {}", storage.dir().display());

    let store = CityStore::load(storage);
    let client = OpenMeteoClient::new(&config.api).context("Failed to build HTTP client")?;
    let state = Arc::new(WeatherState::new(client, store));

    let background = state.start().await;

    let server = CityWeather::new(state, config.search.debounce())
        .serve(rmcp::transport::stdio())
        .await?;
    server.waiting().await?;

    background.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}
