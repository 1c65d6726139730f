//! Saved-city weather client: a persisted city list, a per-city forecast
//! cache fed by Open-Meteo, debounced geocoding search and radar layers,
//! served to MCP clients over stdio.

pub mod client;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod formatters;
pub mod models;
pub mod orchestrator;
pub mod radar;
pub mod search;
pub mod service;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod wmo;

pub use client::OpenMeteoClient;
pub use config::Config;
pub use error::WeatherError;
pub use models::{GeocodingResult, SavedCity};
pub use orchestrator::{LoadStatus, WeatherState};
pub use search::{CitySearch, SearchState};
pub use service::CityWeather;
pub use snapshot::WeatherSnapshot;
pub use store::CityStore;
