use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::constants::{
    CURRENT_FIELDS, DAILY_FIELDS, FORECAST_DAYS, HOURLY_FIELDS, MIN_QUERY_CHARS,
    RAINVIEWER_TILE_HOST, SEARCH_RESULT_LIMIT, USER_AGENT,
};
use crate::error::WeatherError;
use crate::models::{
    GeocodingResponse, GeocodingResult, OpenMeteoResponse, RainViewerMaps, SavedCity,
};
use crate::radar::RadarFrames;
use crate::snapshot::WeatherSnapshot;

/// HTTP client for the forecast, geocoding and radar frame services
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Arc<Client>,
    api: Arc<ApiConfig>,
}

impl OpenMeteoClient {
    pub fn new(api: &ApiConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(api.request_timeout())
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api: Arc::new(api.clone()),
        })
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| WeatherError::InvalidResponse(e.to_string()))
    }

    /// Fetches current, hourly and daily data for `city` and normalizes it
    pub async fn fetch_weather(&self, city: &SavedCity) -> Result<WeatherSnapshot, WeatherError> {
        tracing::debug!(
            "Fetching forecast for {} ({}, {})",
            city.name,
            city.latitude,
            city.longitude
        );

        let url = format!("{}/forecast", self.api.forecast_base);
        let query = [
            ("latitude", city.latitude.to_string()),
            ("longitude", city.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ];

        let raw = self.make_request::<OpenMeteoResponse>(&url, &query).await?;
        WeatherSnapshot::from_response(raw, city, chrono::Utc::now())
    }

    /// Looks up cities matching `query`.
    ///
    /// Queries shorter than two characters return nothing without a request.
    /// Every failure is reported as an empty result.
    pub async fn search_cities(&self, query: &str) -> Vec<GeocodingResult> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let url = format!("{}/search", self.api.geocoding_base);
        let params = [
            ("name", query.to_string()),
            ("count", SEARCH_RESULT_LIMIT.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        match self.make_request::<GeocodingResponse>(&url, &params).await {
            Ok(body) => body.results.unwrap_or_default(),
            Err(e) => {
                tracing::debug!("City search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Resolves the available precipitation radar frames
    pub async fn radar_frames(&self) -> Result<RadarFrames, WeatherError> {
        let url = format!("{}/public/weather-maps.json", self.api.rainviewer_base);
        let maps = self.make_request::<RainViewerMaps>(&url, &[]).await?;

        Ok(RadarFrames {
            host: maps.host.unwrap_or_else(|| RAINVIEWER_TILE_HOST.to_string()),
            timestamps: maps
                .radar
                .map(|r| r.past.into_iter().map(|f| f.time).collect())
                .unwrap_or_default(),
        })
    }
}
