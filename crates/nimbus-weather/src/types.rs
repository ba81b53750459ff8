use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::air_quality::AirQualityLevel;
use crate::units::MeasurementSystem;

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Condition summary as reported by the provider ("Clouds", "broken clouds", "04d").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Temperature and atmosphere block, in the measurement system of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: u32,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Current conditions for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub coord: Coordinates,
    pub weather: Vec<Condition>,
    pub main: Readings,
    #[serde(default)]
    pub visibility: Option<u32>,
    pub wind: Wind,
    pub sys: SunTimes,
    /// Shift in seconds from UTC
    #[serde(default)]
    pub timezone: i32,
}

impl CurrentConditions {
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

/// One 3-hour forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: Readings,
    pub weather: Vec<Condition>,
    /// Probability of precipitation, 0.0..=1.0
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    #[serde(default)]
    pub timezone: i32,
}

/// Multi-point forecast at 3-hour granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

/// Everything fetched for one place, kept as the session payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    /// Measurement system the provider answered in
    pub system: MeasurementSystem,
    pub current: CurrentConditions,
    pub forecast: Option<Forecast>,
    pub air_quality: Option<AirQualityLevel>,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherPayload {
    pub fn new(system: MeasurementSystem, current: CurrentConditions) -> Self {
        Self {
            system,
            current,
            forecast: None,
            air_quality: None,
            fetched_at: Utc::now(),
        }
    }

    /// Local offset of the place, falling back to UTC for nonsense values.
    pub fn offset(&self) -> FixedOffset {
        offset_from_seconds(self.current.timezone)
    }
}

pub(crate) fn offset_from_seconds(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

/// Geolocation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this system")]
    Unavailable,
    #[error("Unable to retrieve location: {0}")]
    DeniedOrFailed(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable => "Geolocation is not supported on this system.",
            Self::DeniedOrFailed(_) => {
                "Unable to retrieve your location. Please allow location access or search manually."
            }
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("No API key configured")]
    MissingApiKey,
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) if e.is_timeout() => "The weather request timed out. Please try again.",
            Self::Network(_) => "Unable to reach the weather service. Check your internet connection.",
            Self::LocationNotFound(_) => "Location not found. Check the spelling and try again.",
            Self::InvalidApiKey => "Weather API key is invalid. Check settings.",
            Self::MissingApiKey => "No weather API key configured. Set OPENWEATHER_API_KEY.",
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later."
            }
            Self::Api { .. } => "Weather service error. Please try again.",
            Self::Parse(_) => "Received an unexpected response from the weather service.",
        }
    }
}
