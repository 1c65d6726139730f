/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("mcp-city-weather/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo forecast API base URL
pub const OPEN_METEO_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Open-Meteo geocoding API base URL
pub const GEOCODING_API_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

/// RainViewer API base URL (radar frame lookup)
pub const RAINVIEWER_API_BASE: &str = "https://api.rainviewer.com";

/// Tile host used when the RainViewer lookup omits one
pub const RAINVIEWER_TILE_HOST: &str = "https://tilecache.rainviewer.com";

/// Storage key holding the saved-city list
pub const STORAGE_KEY: &str = "weatherapp_cities";

pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m,is_day,uv_index";
pub const HOURLY_FIELDS: &str = "temperature_2m,weather_code,precipitation_probability,is_day";
pub const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset";

pub const FORECAST_DAYS: u8 = 7;
pub const HOURLY_WINDOW: usize = 24;

pub const SEARCH_RESULT_LIMIT: u8 = 8;
pub const MIN_QUERY_CHARS: usize = 2;
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Message surfaced when the active city's weather cannot be loaded
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load weather data";
