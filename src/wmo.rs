//! WMO weather interpretation codes.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Display label and icon name for one weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherInfo {
    pub label: &'static str,
    pub icon: &'static str,
}

const fn info(label: &'static str, icon: &'static str) -> WeatherInfo {
    WeatherInfo { label, icon }
}

/// Converts a WMO weather code to its label and icon.
pub fn weather_info(code: i32) -> WeatherInfo {
    match code {
        0 => info("Clear sky", "sun"),
        1 => info("Mainly clear", "sun"),
        2 => info("Partly cloudy", "cloud-sun"),
        3 => info("Overcast", "cloud"),
        45 => info("Foggy", "cloud-fog"),
        48 => info("Rime fog", "cloud-fog"),
        51 => info("Light drizzle", "cloud-drizzle"),
        53 => info("Moderate drizzle", "cloud-drizzle"),
        55 => info("Dense drizzle", "cloud-drizzle"),
        56 => info("Freezing drizzle", "cloud-drizzle"),
        57 => info("Dense freezing drizzle", "cloud-drizzle"),
        61 => info("Slight rain", "cloud-rain"),
        63 => info("Moderate rain", "cloud-rain"),
        65 => info("Heavy rain", "cloud-rain"),
        66 => info("Freezing rain", "cloud-rain"),
        67 => info("Heavy freezing rain", "cloud-rain"),
        71 => info("Slight snow", "cloud-snow"),
        73 => info("Moderate snow", "cloud-snow"),
        75 => info("Heavy snow", "cloud-snow"),
        77 => info("Snow grains", "cloud-snow"),
        80 => info("Slight showers", "cloud-rain"),
        81 => info("Moderate showers", "cloud-rain"),
        82 => info("Violent showers", "cloud-rain"),
        85 => info("Slight snow showers", "cloud-snow"),
        86 => info("Heavy snow showers", "cloud-snow"),
        95 => info("Thunderstorm", "cloud-lightning"),
        96 => info("Thunderstorm with hail", "cloud-lightning"),
        99 => info("Thunderstorm with heavy hail", "cloud-lightning"),
        _ => info("Unknown", "cloud"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_codes() {
        assert_eq!(weather_info(0).label, "Clear sky");
        assert_eq!(weather_info(1).icon, "sun");
    }

    #[test]
    fn test_fog_variants() {
        assert_eq!(weather_info(45).label, "Foggy");
        assert_eq!(weather_info(48).label, "Rime fog");
        assert_eq!(weather_info(48).icon, "cloud-fog");
    }

    #[test]
    fn test_freezing_precipitation() {
        assert_eq!(weather_info(56).icon, "cloud-drizzle");
        assert_eq!(weather_info(67).label, "Heavy freezing rain");
    }

    #[test]
    fn test_thunderstorm() {
        assert_eq!(weather_info(95).icon, "cloud-lightning");
        assert_eq!(weather_info(99).label, "Thunderstorm with heavy hail");
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(weather_info(4), info("Unknown", "cloud"));
        assert_eq!(weather_info(-1).label, "Unknown");
    }
}
