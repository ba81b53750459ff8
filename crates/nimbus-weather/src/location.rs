//! Where am I? A small port with an IP-lookup implementation.

use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::types::{Coordinates, GeolocationError};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"));

/// Supplies the device position or a geolocation error.
pub trait Locator: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// Locator that always reports the capability as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocator;

impl Locator for NoLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
}

/// Approximate position from the public IP address (ip-api.com style JSON).
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    lookup_url: Option<String>,
}

impl IpLocator {
    /// `None` disables lookups; every call then fails with `Unavailable`.
    pub fn new(lookup_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build geolocation client, using defaults: {}", e);
                Client::new()
            });

        Self { client, lookup_url }
    }
}

impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let Some(url) = self.lookup_url.as_deref() else {
            return Err(GeolocationError::Unavailable);
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::debug!("Geolocation request failed: {}", e);
            GeolocationError::DeniedOrFailed(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(GeolocationError::DeniedOrFailed(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| GeolocationError::DeniedOrFailed(e.to_string()))?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            return Err(GeolocationError::DeniedOrFailed(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!("Located at {}, {}", lat, lon);
                Ok(Coordinates { lat, lon })
            }
            _ => Err(GeolocationError::DeniedOrFailed(
                "lookup returned no coordinates".to_string(),
            )),
        }
    }
}
