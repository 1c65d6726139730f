use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::LOAD_ERROR_MESSAGE;
use crate::error::WeatherError;
use crate::formatters::{
    format_city_list, format_search_results, format_search_state, format_snapshot, format_status,
};
use crate::models::{
    CityNameRequest, GetRadarRequest, GetWeatherRequest, SavedCity, SearchCitiesRequest,
};
use crate::orchestrator::WeatherState;
use crate::radar::{RadarLayer, RadarView};
use crate::search::CitySearch;
use crate::snapshot::WeatherSnapshot;

/// MCP front end over the shared weather state
#[derive(Clone)]
pub struct CityWeather {
    state: Arc<WeatherState>,
    search: Arc<CitySearch>,
    tool_router: ToolRouter<Self>,
}

fn text(output: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(output.into())])
}

impl CityWeather {
    /// `search_debounce` is the quiet period for the live search session.
    pub fn new(state: Arc<WeatherState>, search_debounce: Duration) -> Self {
        let search = CitySearch::new(state.client().clone(), search_debounce);
        Self {
            state,
            search: Arc::new(search),
            tool_router: Self::tool_router(),
        }
    }

    /// Renders a load result; failures still show the last cached snapshot
    async fn weather_result(
        &self,
        city: &SavedCity,
        result: Result<Arc<WeatherSnapshot>, WeatherError>,
    ) -> CallToolResult {
        match result {
            Ok(snapshot) => text(format_snapshot(&snapshot)),
            Err(e) => {
                let mut output = format!("{}. {}", LOAD_ERROR_MESSAGE, e.user_message());
                if let Some(stale) = self.state.snapshot(&city.name).await {
                    output.push_str("\n\nLast known weather:\n\n");
                    output.push_str(&format_snapshot(&stale));
                }
                CallToolResult::error(vec![Content::text(output)])
            }
        }
    }

    async fn require_active(&self) -> Result<SavedCity, McpError> {
        self.state
            .active_city()
            .await
            .ok_or_else(|| McpError::invalid_params("No active city. Add a city first.", None))
    }
}

#[tool_handler]
impl ServerHandler for CityWeather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-city-weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Keeps a list of saved cities with cached current conditions, 24-hour and \
                7-day forecasts from Open-Meteo. Search for cities, save them, pick the \
                active one, and view its weather or radar layers."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl CityWeather {
    /// Lists saved cities
    #[tool(description = "List saved cities. The active city is marked with '*'; \
        cached temperatures are shown when available.")]
    async fn list_cities(&self) -> Result<CallToolResult, McpError> {
        let cities = self.state.cities().await;
        let active = self.state.active_city().await;
        let cache = self.state.snapshots().await;

        let mut output = format_city_list(&cities, active.as_ref(), &cache);
        if let Some(status) = format_status(&self.state.status()) {
            output.push_str(&format!("\n{}\n", status));
        }
        Ok(text(output))
    }

    #[tool(description = "Save a city (name, country, latitude, longitude), usually taken from \
        search_cities results. Cities are unique by name; saving a duplicate name does nothing.")]
    async fn add_city(
        &self,
        Parameters(city): Parameters<SavedCity>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Adding city: {}", city.name);

        let name = city.name.clone();
        if self.state.add_city(city).await {
            Ok(text(format!("Saved {}. Its weather will load in the background.", name)))
        } else {
            Ok(text(format!("{} is already saved.", name)))
        }
    }

    #[tool(description = "Remove a saved city by name (case-sensitive). If it was active, the \
        first remaining city becomes active.")]
    async fn remove_city(
        &self,
        Parameters(request): Parameters<CityNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Removing city: {}", request.name);

        if !self.state.remove_city(&request.name).await {
            return Err(McpError::invalid_params(
                format!("{} is not a saved city.", request.name),
                None,
            ));
        }

        let output = match self.state.active_city().await {
            Some(active) => format!("Removed {}. Active city: {}.", request.name, active.name),
            None => format!("Removed {}. No cities remain.", request.name),
        };
        Ok(text(output))
    }

    #[tool(description = "Make a city active (name, country, latitude, longitude) and load its \
        current weather and forecast.")]
    async fn set_active_city(
        &self,
        Parameters(city): Parameters<SavedCity>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Setting active city: {}", city.name);

        let result = self.state.set_active_city(city.clone()).await;
        Ok(self.weather_result(&city, result).await)
    }

    #[tool(description = "Search for cities by name (at least 2 characters). Returns up to 8 \
        matches with coordinates that can be passed to add_city.")]
    async fn search_cities(
        &self,
        Parameters(request): Parameters<SearchCitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Searching cities: {}", request.query);

        let results = self.state.client().search_cities(&request.query).await;
        Ok(text(format_search_results(&request.query, &results)))
    }

    #[tool(description = "Type into the live search session. Lookups wait for the query to \
        stop changing; read the matches with search_results. Queries under 2 characters clear it.")]
    async fn search_cities_live(
        &self,
        Parameters(request): Parameters<SearchCitiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!("Live search query: {}", request.query);

        self.search.set_query(request.query);
        Ok(text(format_search_state(&self.search.state())))
    }

    #[tool(description = "Show the current matches of the live search session.")]
    async fn search_results(&self) -> Result<CallToolResult, McpError> {
        Ok(text(format_search_state(&self.search.state())))
    }

    #[tool(description = "Get current conditions, the next 24 hours and the 7-day forecast for a \
        saved city (defaults to the active city). Uses cached data when available.")]
    async fn get_weather(
        &self,
        Parameters(request): Parameters<GetWeatherRequest>,
    ) -> Result<CallToolResult, McpError> {
        let city = match request.city {
            Some(name) => match self.state.saved_city(&name).await {
                Some(city) => city,
                None => self
                    .state
                    .active_city()
                    .await
                    .filter(|a| a.name == name)
                    .ok_or_else(|| {
                        McpError::invalid_params(format!("{} is not a saved city.", name), None)
                    })?,
            },
            None => self.require_active().await?,
        };

        if let Some(snapshot) = self.state.snapshot(&city.name).await {
            return Ok(text(format_snapshot(&snapshot)));
        }

        tracing::info!("No cached weather for {}, fetching", city.name);
        let result = self.state.load_weather_for_city(&city).await;
        Ok(self.weather_result(&city, result).await)
    }

    #[tool(description = "Reload weather for the active city.")]
    async fn refresh_weather(&self) -> Result<CallToolResult, McpError> {
        let city = self.require_active().await?;
        tracing::info!("Refreshing weather for {}", city.name);

        let result = self.state.load_weather_for_city(&city).await;
        Ok(self.weather_result(&city, result).await)
    }

    #[tool(description = "Get map tile layers centered on the active city. Layer is one of \
        precipitation (default), clouds, temperature, wind. Returns JSON with tile URL templates.")]
    async fn get_radar(
        &self,
        Parameters(request): Parameters<GetRadarRequest>,
    ) -> Result<CallToolResult, McpError> {
        let city = self.require_active().await?;
        let layer = request.layer.unwrap_or_default();

        let frames = if layer == RadarLayer::Precipitation {
            match self.state.client().radar_frames().await {
                Ok(frames) => Some(frames),
                Err(e) => {
                    tracing::debug!("Radar frame lookup failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let app_id = &self.state.client().api().openweathermap_app_id;
        let view = RadarView::build(&city, layer, frames.as_ref(), app_id);
        let json = serde_json::to_string_pretty(&view).map_err(|e| {
            McpError::internal_error(format!("Failed to encode radar view: {}", e), None)
        })?;

        Ok(text(json))
    }
}
