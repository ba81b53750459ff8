//! OpenWeatherMap client for current conditions, forecast and air quality.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::air_quality::{AirPollutionResponse, AirQualityLevel};
use crate::types::{Coordinates, CurrentConditions, Forecast, WeatherError};
use crate::units::MeasurementSystem;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Error body returned by the provider, e.g. `{"cod":"404","message":"city not found"}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)
    }

    /// Current conditions by city name.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and unparseable bodies.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_city(
        &self,
        city: &str,
        system: MeasurementSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::LocationNotFound(String::new()));
        }
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key()?),
                ("units", system.as_query()),
            ])
            .send()
            .await?;

        self.handle_response(response, city).await
    }

    /// Current conditions by coordinates.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and unparseable bodies.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_coords(
        &self,
        coords: Coordinates,
        system: MeasurementSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coords.lat.to_string().as_str()),
                ("lon", coords.lon.to_string().as_str()),
                ("appid", self.api_key()?),
                ("units", system.as_query()),
            ])
            .send()
            .await?;

        let place = format!("{}, {}", coords.lat, coords.lon);
        self.handle_response(response, &place).await
    }

    /// 3-hour forecast by city name.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and unparseable bodies.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, city: &str, system: MeasurementSystem) -> Result<Forecast, WeatherError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key()?),
                ("units", system.as_query()),
            ])
            .send()
            .await?;

        self.handle_response(response, city).await
    }

    /// Air-quality level by coordinates. `Ok(None)` when the provider has no sample.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and unparseable bodies.
    #[instrument(skip(self), level = "info")]
    pub async fn air_quality(&self, coords: Coordinates) -> Result<Option<AirQualityLevel>, WeatherError> {
        let url = format!("{}/data/2.5/air_pollution", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coords.lat.to_string().as_str()),
                ("lon", coords.lon.to_string().as_str()),
                ("appid", self.api_key()?),
            ])
            .send()
            .await?;

        let place = format!("{}, {}", coords.lat, coords.lon);
        let body: AirPollutionResponse = self.handle_response(response, &place).await?;
        Ok(body.level())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        place: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            return serde_json::from_str(&text).map_err(|e| {
                tracing::debug!("Unparseable weather response: {}", e);
                WeatherError::Parse(e.to_string())
            });
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);
        tracing::debug!("Weather API returned {}: {}", status, message);

        match status.as_u16() {
            401 => Err(WeatherError::InvalidApiKey),
            404 => Err(WeatherError::LocationNotFound(place.to_string())),
            code => Err(WeatherError::Api {
                status: code,
                message,
            }),
        }
    }
}
