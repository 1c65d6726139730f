//! Shared fixtures for the mock-server tests.

#![allow(dead_code)]

use chrono::{Duration, Timelike, Utc};
use mcp_city_weather::config::ApiConfig;
use mcp_city_weather::SavedCity;
use wiremock::MockServer;

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        forecast_base: format!("{}/v1", server.uri()),
        geocoding_base: format!("{}/v1", server.uri()),
        rainviewer_base: server.uri(),
        request_timeout_secs: 5,
        ..ApiConfig::default()
    }
}

pub fn london() -> SavedCity {
    SavedCity::new("London", "United Kingdom", 51.5074, -0.1278)
}

pub fn tokyo() -> SavedCity {
    SavedCity::new("Tokyo", "Japan", 35.6762, 139.6503)
}

pub fn paris() -> SavedCity {
    SavedCity::new("Paris", "France", 48.8566, 2.3522)
}

/// A forecast body in UTC whose hourly series starts three hours ago and
/// runs for two days, so the 24-hour window is always full.
pub fn forecast_body(temperature: f64) -> serde_json::Value {
    let start = Utc::now().naive_utc() - Duration::hours(3);
    let start = start.with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap();
    let hours: Vec<String> = (0..48)
        .map(|h| (start + Duration::hours(h)).format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    let days: Vec<String> = (0..7)
        .map(|d| (start.date() + Duration::days(d)).format("%Y-%m-%d").to_string())
        .collect();
    let sunrise: Vec<String> = days.iter().map(|d| format!("{d}T06:45")).collect();
    let sunset: Vec<String> = days.iter().map(|d| format!("{d}T18:10")).collect();

    serde_json::json!({
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "GMT",
        "utc_offset_seconds": 0,
        "current": {
            "temperature_2m": temperature,
            "relative_humidity_2m": 70,
            "apparent_temperature": temperature - 1.6,
            "weather_code": 2,
            "wind_speed_10m": 11.2,
            "wind_direction_10m": 240,
            "is_day": 1,
            "uv_index": 2.6
        },
        "hourly": {
            "time": hours,
            "temperature_2m": vec![temperature; 48],
            "weather_code": vec![2; 48],
            "precipitation_probability": vec![15; 48],
            "is_day": vec![1; 48]
        },
        "daily": {
            "time": days,
            "weather_code": vec![61; 7],
            "temperature_2m_max": vec![temperature + 3.5; 7],
            "temperature_2m_min": vec![temperature - 4.5; 7],
            "precipitation_probability_max": vec![40; 7],
            "sunrise": sunrise,
            "sunset": sunset
        }
    })
}
