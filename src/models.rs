use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::radar::RadarLayer;

// ============================================================================
// Saved locations
// ============================================================================

/// A city the user has saved. `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SavedCity {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SavedCity {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            latitude,
            longitude,
        }
    }
}

impl From<GeocodingResult> for SavedCity {
    fn from(result: GeocodingResult) -> Self {
        Self {
            name: result.name,
            country: result.country,
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

// ============================================================================
// Open-Meteo Forecast API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: CurrentData,
    pub hourly: HourlyData,
    pub daily: DailyData,
}

#[derive(Debug, Deserialize)]
pub struct CurrentData {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub is_day: u8,
    pub uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub weather_code: Vec<i32>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub is_day: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<f64>,
    #[serde(rename = "precipitation_probability_max")]
    pub precipitation_probability: Vec<Option<f64>>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
}

// ============================================================================
// Open-Meteo Geocoding API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

/// One candidate match from a city search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
}

// ============================================================================
// RainViewer API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RainViewerMaps {
    pub host: Option<String>,
    pub radar: Option<RainViewerRadar>,
}

#[derive(Debug, Deserialize)]
pub struct RainViewerRadar {
    #[serde(default)]
    pub past: Vec<RainViewerFrame>,
}

#[derive(Debug, Deserialize)]
pub struct RainViewerFrame {
    pub time: i64,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CityNameRequest {
    /// Saved city name (case-sensitive)
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchCitiesRequest {
    /// Partial city name, at least two characters
    pub query: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetWeatherRequest {
    /// City name; defaults to the active city
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetRadarRequest {
    /// Map layer; defaults to precipitation
    pub layer: Option<RadarLayer>,
}
