//! Error types shared by the client, store and orchestrator.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the weather services or the local store.
///
/// Nothing here is fatal: callers downgrade these to a user message, an
/// empty result, or the default city list.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status: {0}")]
    Status(StatusCode),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WeatherError {
    /// Returns a message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(e) if e.is_timeout() => {
                "The weather service timed out. Please try again."
            }
            WeatherError::Network(_) => "Unable to reach the weather service.",
            WeatherError::Status(status) if status.is_server_error() => {
                "The weather service is having issues. Please try again later."
            }
            WeatherError::Status(_) => "The weather request was rejected.",
            WeatherError::InvalidResponse(_) => "Received unexpected weather data.",
            WeatherError::Storage(_) | WeatherError::Serialization(_) => {
                "Saved cities could not be written."
            }
        }
    }
}
