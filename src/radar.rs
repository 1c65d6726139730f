//! Radar map layers centered on a city.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::SavedCity;

const BASE_TILES: &str = "https://{s}.basemaps.cartocdn.com/light_nolabels/{z}/{x}/{y}{r}.png";
const LABEL_TILES: &str = "https://{s}.basemaps.cartocdn.com/light_only_labels/{z}/{x}/{y}{r}.png";
const OPENWEATHERMAP_TILES: &str = "https://tile.openweathermap.org/map";

const DEFAULT_ZOOM: u8 = 7;
const LABEL_OPACITY: f32 = 0.5;
const OVERLAY_OPACITY: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RadarLayer {
    #[default]
    Precipitation,
    Clouds,
    Temperature,
    Wind,
}

impl RadarLayer {
    /// OpenWeatherMap tile set id for this layer
    fn openweathermap_id(self) -> &'static str {
        match self {
            Self::Precipitation => "precipitation_new",
            Self::Clouds => "clouds_new",
            Self::Temperature => "temp_new",
            Self::Wind => "wind_new",
        }
    }
}

/// Precipitation frames published by RainViewer, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarFrames {
    pub host: String,
    pub timestamps: Vec<i64>,
}

impl RadarFrames {
    pub fn latest(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub layer: RadarLayer,
    pub tiles: Vec<TileLayer>,
}

impl RadarView {
    /// Builds the tile stack for `layer`.
    ///
    /// Precipitation uses the newest RainViewer frame and is left out when no
    /// frame is known. Other layers use OpenWeatherMap tiles.
    pub fn build(
        city: &SavedCity,
        layer: RadarLayer,
        frames: Option<&RadarFrames>,
        app_id: &str,
    ) -> Self {
        let mut tiles = vec![
            TileLayer {
                url_template: BASE_TILES.to_string(),
                opacity: 1.0,
            },
            TileLayer {
                url_template: LABEL_TILES.to_string(),
                opacity: LABEL_OPACITY,
            },
        ];

        let overlay = match layer {
            RadarLayer::Precipitation => frames.and_then(|f| {
                f.latest()
                    .map(|ts| format!("{}/v2/radar/{}/256/{{z}}/{{x}}/{{y}}/2/1_1.png", f.host, ts))
            }),
            other => Some(format!(
                "{}/{}/{{z}}/{{x}}/{{y}}.png?appid={}",
                OPENWEATHERMAP_TILES,
                other.openweathermap_id(),
                app_id
            )),
        };

        if let Some(url_template) = overlay {
            tiles.push(TileLayer {
                url_template,
                opacity: OVERLAY_OPACITY,
            });
        }

        Self {
            latitude: city.latitude,
            longitude: city.longitude,
            zoom: DEFAULT_ZOOM,
            layer,
            tiles,
        }
    }
}
