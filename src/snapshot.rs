//! Normalized weather snapshot built from one forecast response.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::HOURLY_WINDOW;
use crate::error::WeatherError;
use crate::models::{CurrentData, DailyData, HourlyData, OpenMeteoResponse, SavedCity};

/// Timestamp layout used by Open-Meteo for `timezone=auto` responses
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current conditions, temperatures rounded to whole degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub feels_like: i32,
    pub humidity: u8,
    pub wind_speed: i32,
    pub wind_direction: u16,
    pub weather_code: i32,
    pub uv_index: i32,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Location-local wall clock time
    pub time: NaiveDateTime,
    pub temperature: i32,
    pub weather_code: i32,
    pub precipitation_probability: Option<u8>,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: i32,
    pub temp_min: i32,
    pub precipitation_probability: Option<u8>,
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// One fetched and normalized weather payload for a single city.
///
/// Snapshots are never mutated; a refetch replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    pub location: SavedCity,
    pub timezone: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Builds a snapshot from a raw forecast response.
    ///
    /// `now` selects the hourly window: the first entry is the first hour at
    /// or after `now` in the location's local time.
    pub fn from_response(
        raw: OpenMeteoResponse,
        city: &SavedCity,
        now: DateTime<Utc>,
    ) -> Result<Self, WeatherError> {
        let local_now = (now + Duration::seconds(i64::from(raw.utc_offset_seconds))).naive_utc();

        Ok(Self {
            current: current_conditions(&raw.current),
            hourly: hourly_window(&raw.hourly, local_now)?,
            daily: daily_series(&raw.daily)?,
            location: city.clone(),
            timezone: raw.timezone,
            fetched_at: now,
        })
    }
}

/// Rounds half up, matching how the forecast is shown elsewhere (-2.5 -> -2).
pub fn round_degrees(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn current_conditions(raw: &CurrentData) -> CurrentConditions {
    CurrentConditions {
        temperature: round_degrees(raw.temperature_2m),
        feels_like: round_degrees(raw.apparent_temperature),
        humidity: percent(raw.relative_humidity_2m),
        wind_speed: round_degrees(raw.wind_speed_10m),
        wind_direction: raw.wind_direction_10m.round().rem_euclid(360.0) as u16,
        weather_code: raw.weather_code,
        uv_index: round_degrees(raw.uv_index.unwrap_or(0.0)),
        is_day: raw.is_day == 1,
    }
}

fn parse_local(value: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
        .map_err(|e| WeatherError::InvalidResponse(format!("bad timestamp {value:?}: {e}")))
}

/// Fails unless every parallel series covers `len` entries.
fn check_aligned(series: &str, len: usize, lens: &[(&str, usize)]) -> Result<(), WeatherError> {
    for (field, field_len) in lens {
        if *field_len < len {
            return Err(WeatherError::InvalidResponse(format!(
                "{series}.{field} has {field_len} entries, expected {len}"
            )));
        }
    }
    Ok(())
}

fn hourly_window(
    raw: &HourlyData,
    local_now: NaiveDateTime,
) -> Result<Vec<HourlyForecast>, WeatherError> {
    check_aligned(
        "hourly",
        raw.time.len(),
        &[
            ("temperature_2m", raw.temperature_2m.len()),
            ("weather_code", raw.weather_code.len()),
            ("precipitation_probability", raw.precipitation_probability.len()),
            ("is_day", raw.is_day.len()),
        ],
    )?;

    let times = raw
        .time
        .iter()
        .map(|t| parse_local(t))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(start) = times.iter().position(|t| *t >= local_now) else {
        return Ok(Vec::new());
    };

    Ok(times
        .into_iter()
        .enumerate()
        .skip(start)
        .take(HOURLY_WINDOW)
        .map(|(i, time)| HourlyForecast {
            time,
            temperature: round_degrees(raw.temperature_2m[i]),
            weather_code: raw.weather_code[i],
            precipitation_probability: raw.precipitation_probability[i].map(percent),
            is_day: raw.is_day[i] == 1,
        })
        .collect())
}

fn daily_series(raw: &DailyData) -> Result<Vec<DailyForecast>, WeatherError> {
    check_aligned(
        "daily",
        raw.time.len(),
        &[
            ("weather_code", raw.weather_code.len()),
            ("temperature_2m_max", raw.temperature_max.len()),
            ("temperature_2m_min", raw.temperature_min.len()),
            ("precipitation_probability_max", raw.precipitation_probability.len()),
            ("sunrise", raw.sunrise.len()),
            ("sunset", raw.sunset.len()),
        ],
    )?;

    raw.time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|e| WeatherError::InvalidResponse(format!("bad date {date:?}: {e}")))?;
            Ok(DailyForecast {
                date,
                weather_code: raw.weather_code[i],
                temp_max: round_degrees(raw.temperature_max[i]),
                temp_min: round_degrees(raw.temperature_min[i]),
                precipitation_probability: raw.precipitation_probability[i].map(percent),
                sunrise: parse_local(&raw.sunrise[i])?,
                sunset: parse_local(&raw.sunset[i])?,
            })
        })
        .collect()
}
