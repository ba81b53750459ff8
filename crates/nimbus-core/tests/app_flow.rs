//! End-to-end controller tests against a mocked weather provider.

use std::sync::Arc;

use nimbus_core::{App, AppError, Config};
use nimbus_state::{ColorScheme, KeyValueStore, MemoryStore, StateError, ThemeMode};
use nimbus_weather::{Coordinates, GeolocationError, Locator, NoLocator, TemperatureUnit};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a current-conditions JSON body
fn current_body(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": {
            "temp": temp, "feels_like": temp - 1.0, "temp_min": temp - 2.0,
            "temp_max": temp + 2.0, "pressure": 1015, "humidity": 55
        },
        "visibility": 10000,
        "wind": { "speed": 3.0, "deg": 90 },
        "sys": { "country": "FR", "sunrise": 1_700_000_000, "sunset": 1_700_040_000 },
        "timezone": 3600,
        "name": name
    })
}

/// Helper to create a two-day forecast JSON body
fn forecast_body(name: &str) -> serde_json::Value {
    let list: Vec<_> = (0..16)
        .map(|i| {
            serde_json::json!({
                "dt": 1_704_067_200 + i * 3 * 3600,
                "main": {
                    "temp": 10.0, "feels_like": 9.0, "temp_min": 8.0,
                    "temp_max": 12.0, "pressure": 1010, "humidity": 70
                },
                "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
                "pop": 0.4
            })
        })
        .collect();
    serde_json::json!({ "list": list, "city": { "name": name, "timezone": 0 } })
}

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.provider.base_url = server.uri();
    config.provider.api_key = Some("test-key".to_string());
    config
}

fn light() -> ColorScheme {
    ColorScheme::Light
}

fn app_with_store(server: &MockServer, store: Arc<dyn KeyValueStore>) -> App<NoLocator> {
    App::with_parts(test_config(server), store, NoLocator, Box::new(light)).unwrap()
}

async fn mount_city(server: &MockServer, query: &str, name: &str, temp: f64) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(name, temp)))
        .mount(server)
        .await;
}

struct FixedLocator(Coordinates);

impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

#[tokio::test]
async fn test_search_loads_all_regions_and_records_history() {
    let server = MockServer::start().await;
    mount_city(&server, "paris", "Paris", 18.0).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Paris")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "list": [{ "main": { "aqi": 2 } }] })),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut app = app_with_store(&server, store.clone());

    let model = app.search("paris").await.unwrap();
    assert_eq!(model.location, "Paris");
    assert_eq!(model.temperature, "18°C");
    assert_eq!(model.daily.len(), 2);
    assert_eq!(model.hourly.as_ref().map(|h| h.points.len()), Some(8));
    assert_eq!(model.air_quality.as_ref().map(|a| a.label), Some("Fair"));

    // History keeps the provider's spelling
    assert_eq!(app.history(), ["Paris".to_string()]);
    assert_eq!(
        store.get("searchHistory").unwrap().as_deref(),
        Some(r#"["Paris"]"#)
    );
}

#[tokio::test]
async fn test_secondary_failures_leave_regions_empty() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", 18.0).await;
    // forecast and air quality fall through to wiremock's 404

    let mut app = app_with_store(&server, Arc::new(MemoryStore::new()));
    let model = app.search("Paris").await.unwrap();

    assert_eq!(model.temperature, "18°C");
    assert!(model.daily.is_empty());
    assert!(model.hourly.is_none());
    assert!(model.air_quality.is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_payload() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", 18.0).await;

    let mut app = app_with_store(&server, Arc::new(MemoryStore::new()));
    app.search("Paris").await.unwrap();

    let err = app.search("Atlantis").await.unwrap_err();
    assert!(matches!(err, AppError::Weather(_)));
    assert!(!err.is_blocking());

    let model = app.display().unwrap();
    assert_eq!(model.location, "Error fetching weather");
    assert_eq!(model.temperature, "18°C");
    assert_eq!(app.history(), ["Paris".to_string()]);
}

#[tokio::test]
async fn test_unit_cycle_rerenders_without_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 18.0)))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut app = app_with_store(&server, store.clone());
    app.search("Paris").await.unwrap();

    assert_eq!(app.cycle_unit(), TemperatureUnit::Fahrenheit);
    assert_eq!(app.display().unwrap().temperature, "64°F");

    assert_eq!(app.cycle_unit(), TemperatureUnit::Kelvin);
    assert_eq!(app.display().unwrap().temperature, "291K");

    assert_eq!(app.cycle_unit(), TemperatureUnit::Celsius);
    assert_eq!(app.display().unwrap().temperature, "18°C");
    assert_eq!(store.get("temperatureUnit").unwrap().as_deref(), Some("celsius"));
}

#[tokio::test]
async fn test_fahrenheit_fetches_imperial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 64.4)))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::with_values([("temperatureUnit", "fahrenheit")]));
    let mut app = app_with_store(&server, store);

    let model = app.search("Paris").await.unwrap();
    assert_eq!(model.temperature, "64°F");

    app.set_unit(TemperatureUnit::Celsius).unwrap();
    assert_eq!(app.display().unwrap().temperature, "18°C");
}

#[tokio::test]
async fn test_toggle_favorite_requires_city() {
    let server = MockServer::start().await;
    let mut app = app_with_store(&server, Arc::new(MemoryStore::new()));

    let err = app.toggle_favorite().unwrap_err();
    assert!(matches!(err, AppError::State(StateError::NoCurrentCity)));
    assert!(err.is_blocking());
    assert_eq!(err.user_message(), "Please search for a city first");
}

#[tokio::test]
async fn test_toggle_favorite_round_trip() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", 18.0).await;

    let store = Arc::new(MemoryStore::new());
    let mut app = app_with_store(&server, store.clone());
    app.search("Paris").await.unwrap();

    assert!(app.toggle_favorite().unwrap().added);
    assert!(app.is_current_favorite());
    assert_eq!(store.get("favoriteCities").unwrap().as_deref(), Some(r#"["Paris"]"#));

    assert!(!app.toggle_favorite().unwrap().added);
    assert!(app.favorites().is_empty());
}

#[tokio::test]
async fn test_locate_without_capability_is_blocking() {
    let server = MockServer::start().await;
    let mut app = app_with_store(&server, Arc::new(MemoryStore::new()));

    let err = app.locate().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Geolocation(GeolocationError::Unavailable)
    ));
    assert!(err.is_blocking());
    assert!(app.display().is_none());
}

#[tokio::test]
async fn test_locate_fetches_by_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 18.0)))
        .mount(&server)
        .await;

    let locator = FixedLocator(Coordinates { lat: 48.85, lon: 2.35 });
    let mut app = App::with_parts(
        test_config(&server),
        Arc::new(MemoryStore::new()),
        locator,
        Box::new(light),
    )
    .unwrap();

    let model = app.locate().await.unwrap();
    assert_eq!(model.location, "Paris");
    assert_eq!(app.history(), ["Paris".to_string()]);
}

#[tokio::test]
async fn test_auto_locate_runs_once() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let mut app = app_with_store(&server, store.clone());

    assert!(app.should_auto_locate());
    assert!(app.auto_locate().await.is_err());
    assert!(!app.should_auto_locate());
    assert_eq!(store.get("hasSearched").unwrap().as_deref(), Some("true"));

    // A fresh session over the same store stays quiet
    let app = app_with_store(&server, store);
    assert!(!app.should_auto_locate());
}

#[tokio::test]
async fn test_auto_locate_skipped_with_saved_state() {
    let server = MockServer::start().await;

    let favorites = Arc::new(MemoryStore::with_values([("favoriteCities", r#"["Oslo"]"#)]));
    assert!(!app_with_store(&server, favorites).should_auto_locate());

    let history = Arc::new(MemoryStore::with_values([("searchHistory", r#"["Oslo"]"#)]));
    assert!(!app_with_store(&server, history).should_auto_locate());

    let mut config = test_config(&server);
    config.location.auto_locate = false;
    let app = App::with_parts(config, Arc::new(MemoryStore::new()), NoLocator, Box::new(light)).unwrap();
    assert!(!app.should_auto_locate());
}

#[tokio::test]
async fn test_reduced_features_hide_regions() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", 18.0).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Paris")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.features = nimbus_core::FeatureConfig::reduced();
    let mut app = App::with_parts(config, Arc::new(MemoryStore::new()), NoLocator, Box::new(light)).unwrap();

    let model = app.search("Paris").await.unwrap();
    assert_eq!(model.daily.len(), 2);
    assert!(model.hourly.is_none());
    assert!(model.air_quality.is_none());

    // Kelvin is not offered in the reduced set
    assert_eq!(app.cycle_unit(), TemperatureUnit::Fahrenheit);
    assert_eq!(app.cycle_unit(), TemperatureUnit::Celsius);
}

#[tokio::test]
async fn test_reduced_features_reject_kelvin() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.features = nimbus_core::FeatureConfig::reduced();
    let store = Arc::new(MemoryStore::new());
    let mut app = App::with_parts(config, store.clone(), NoLocator, Box::new(light)).unwrap();

    let err = app.set_unit(TemperatureUnit::Kelvin).unwrap_err();
    assert!(matches!(
        err,
        AppError::State(StateError::UnitNotEnabled(TemperatureUnit::Kelvin))
    ));
    assert_eq!(err.user_message(), "That temperature unit is not available.");
    assert_eq!(app.unit(), TemperatureUnit::Celsius);
    assert_eq!(store.get("temperatureUnit").unwrap(), None);
}

#[tokio::test]
async fn test_theme_cycle_and_resolution() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let mut app = app_with_store(&server, store.clone());

    assert_eq!(app.theme(), ThemeMode::Auto);
    assert_eq!(app.resolved_theme(), ColorScheme::Light);

    assert_eq!(app.cycle_theme(), ThemeMode::Light);
    assert_eq!(app.cycle_theme(), ThemeMode::Dark);
    assert_eq!(app.resolved_theme(), ColorScheme::Dark);
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.provider.request_timeout_secs = 0;

    let result = App::with_parts(config, Arc::new(MemoryStore::new()), NoLocator, Box::new(light));
    assert!(matches!(result, Err(AppError::Config(_))));
}
