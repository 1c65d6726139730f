use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{GeocodingResult, SavedCity};
use crate::constants::MIN_QUERY_CHARS;
use crate::orchestrator::LoadStatus;
use crate::search::SearchState;
use crate::snapshot::WeatherSnapshot;
use crate::wmo::weather_info;

/// Formats a weather snapshot into a human-readable string
pub fn format_snapshot(snapshot: &WeatherSnapshot) -> String {
    let current = &snapshot.current;
    let info = weather_info(current.weather_code);
    let location = &snapshot.location;

    let mut output = format!(
        "{}, {}\n{}\u{00b0}C, {} ({})\n  Feels like: {}\u{00b0}C\n  Humidity: {}%\n  Wind: {} km/h from {}\u{00b0}\n  UV Index: {}\n  {}\n",
        location.name,
        location.country,
        current.temperature,
        info.label,
        info.icon,
        current.feels_like,
        current.humidity,
        current.wind_speed,
        current.wind_direction,
        current.uv_index,
        if current.is_day { "Daytime" } else { "Night" },
    );

    if !snapshot.hourly.is_empty() {
        output.push_str("\nNext hours:\n");
        for (i, hour) in snapshot.hourly.iter().enumerate() {
            let label = if i == 0 {
                "Now".to_string()
            } else {
                hour.time.format("%-I %p").to_string()
            };
            output.push_str(&format!(
                "  {:>5}  {:>4}\u{00b0}  {}{}\n",
                label,
                hour.temperature,
                weather_info(hour.weather_code).label,
                precipitation(hour.precipitation_probability),
            ));
        }
    }

    if !snapshot.daily.is_empty() {
        output.push_str("\nDaily forecast:\n");
        for day in &snapshot.daily {
            output.push_str(&format!(
                "  {}  {}\u{00b0} / {}\u{00b0}  {}{}  (sunrise {}, sunset {})\n",
                day.date.format("%a, %b %-d"),
                day.temp_max,
                day.temp_min,
                weather_info(day.weather_code).label,
                precipitation(day.precipitation_probability),
                day.sunrise.format("%-I:%M %p"),
                day.sunset.format("%-I:%M %p"),
            ));
        }
    }

    output.push_str(&format!(
        "\nUpdated: {} UTC ({})\n",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M"),
        snapshot.timezone
    ));
    output
}

fn precipitation(chance: Option<u8>) -> String {
    match chance {
        Some(p) if p > 0 => format!(", {}% precip", p),
        _ => String::new(),
    }
}

/// Formats the saved-city list with cached temperatures
pub fn format_city_list(
    cities: &[SavedCity],
    active: Option<&SavedCity>,
    cache: &HashMap<String, Arc<WeatherSnapshot>>,
) -> String {
    if cities.is_empty() {
        return "No saved cities.".to_string();
    }

    let mut output = String::from("Saved cities:\n\n");
    for city in cities {
        let marker = if active.is_some_and(|a| a.name == city.name) { "*" } else { " " };
        let weather = match cache.get(&city.name) {
            Some(s) => format!(
                "{}\u{00b0}C, {}",
                s.current.temperature,
                weather_info(s.current.weather_code).label
            ),
            None => "loading".to_string(),
        };
        output.push_str(&format!(
            "{} {} ({}) [{:.4}, {:.4}]: {}\n",
            marker, city.name, city.country, city.latitude, city.longitude, weather
        ));
    }
    output
}

/// Formats city search matches
pub fn format_search_results(query: &str, results: &[GeocodingResult]) -> String {
    if results.is_empty() {
        return format!("No cities found for \"{}\".", query);
    }

    let mut output = format!("Cities matching \"{}\":\n\n", query);
    for (i, r) in results.iter().enumerate() {
        let region = match &r.admin1 {
            Some(admin1) => format!("{}, {}", admin1, r.country),
            None => r.country.clone(),
        };
        output.push_str(&format!(
            "{}. {} ({}) [{:.4}, {:.4}]\n",
            i + 1,
            r.name,
            region,
            r.latitude,
            r.longitude
        ));
    }
    output
}

/// Formats where a live search session stands
pub fn format_search_state(state: &SearchState) -> String {
    if state.searching {
        format!("Searching for \"{}\"...", state.query)
    } else if state.query.chars().count() < MIN_QUERY_CHARS {
        format!("Type at least {} characters to search.", MIN_QUERY_CHARS)
    } else {
        format_search_results(&state.query, &state.results)
    }
}

/// Appends the load status to a response when it carries news
pub fn format_status(status: &LoadStatus) -> Option<String> {
    match (&status.error, status.loading) {
        (Some(error), _) => Some(format!("Error: {}", error)),
        (None, true) => Some("Loading...".to_string()),
        (None, false) => None,
    }
}
