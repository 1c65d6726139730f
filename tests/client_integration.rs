//! OpenMeteoClient against a mock HTTP server.

mod common;

use common::{api_config, forecast_body, london};
use mcp_city_weather::{OpenMeteoClient, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_weather_normalizes_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5074"))
        .and(query_param("longitude", "-0.1278"))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "7"))
        .and(query_param("hourly", "temperature_2m,weather_code,precipitation_probability,is_day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(12.5)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let snapshot = client.fetch_weather(&london()).await.unwrap();

    assert_eq!(snapshot.current.temperature, 13);
    assert_eq!(snapshot.current.feels_like, 11);
    assert_eq!(snapshot.current.uv_index, 3);
    assert!(snapshot.current.is_day);
    assert_eq!(snapshot.hourly.len(), 24);
    assert!(snapshot.hourly[0].time >= snapshot.fetched_at.naive_utc());
    assert_eq!(snapshot.daily.len(), 7);
    assert_eq!(snapshot.daily[0].temp_max, 16);
    assert_eq!(snapshot.daily[0].temp_min, 8);
    assert_eq!(snapshot.location, london());
}

#[tokio::test]
async fn test_fetch_weather_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let err = client.fetch_weather(&london()).await.unwrap_err();

    assert!(matches!(err, WeatherError::Status(s) if s.as_u16() == 502));
}

#[tokio::test]
async fn test_fetch_weather_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "latitude": 1.0 })),
        )
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let err = client.fetch_weather(&london()).await.unwrap_err();

    assert!(matches!(err, WeatherError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_search_short_query_sends_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();

    for query in ["", "L", "東"] {
        assert!(client.search_cities(query).await.is_empty(), "query {query:?}");
    }
}

#[tokio::test]
async fn test_search_cities_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "San Fran"))
        .and(query_param("count", "8"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {
                    "id": 5391959,
                    "name": "San Francisco",
                    "latitude": 37.77493,
                    "longitude": -122.41942,
                    "country": "United States",
                    "admin1": "California"
                },
                {
                    "id": 3621911,
                    "name": "San Francisco",
                    "latitude": 9.99,
                    "longitude": -84.13,
                    "country": "Costa Rica"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let results = client.search_cities("San Fran").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].admin1.as_deref(), Some("California"));
    assert_eq!(results[1].country, "Costa Rica");
    assert!(results[1].admin1.is_none());
}

#[tokio::test]
async fn test_search_two_char_query_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "東京"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "name": "Tokyo",
                "latitude": 35.6895,
                "longitude": 139.69171,
                "country": "Japan"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    assert_eq!(client.search_cities("東京").await.len(), 1);
}

#[tokio::test]
async fn test_search_missing_results_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "generationtime_ms": 0.4 })),
        )
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    assert!(client.search_cities("Xyzzy").await.is_empty());
}

#[tokio::test]
async fn test_search_server_error_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    assert!(client.search_cities("London").await.is_empty());
}

#[tokio::test]
async fn test_radar_frames_latest() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/weather-maps.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": "2.0",
            "host": "https://tiles.example.com",
            "radar": {
                "past": [
                    {"time": 1760600000, "path": "/a"},
                    {"time": 1760600600, "path": "/b"}
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let frames = client.radar_frames().await.unwrap();

    assert_eq!(frames.host, "https://tiles.example.com");
    assert_eq!(frames.latest(), Some(1760600600));
}

#[tokio::test]
async fn test_radar_frames_default_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/weather-maps.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(&api_config(&mock_server)).unwrap();
    let frames = client.radar_frames().await.unwrap();

    assert_eq!(frames.host, "https://tilecache.rainviewer.com");
    assert_eq!(frames.latest(), None);
}
