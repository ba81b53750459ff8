//! Centralized error types for Nimbus.
//!
//! Every failure the dashboard can show ends up as an [`AppError`]; use
//! `user_message()` for the text shown to the user and `Display` for logs.

use thiserror::Error;

use nimbus_state::StateError;
use nimbus_weather::{GeolocationError, WeatherError};

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Weather(e) => e.user_message(),
            AppError::Geolocation(e) => e.user_message(),
            AppError::State(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Errors the user must acknowledge (the UI shows these as a blocking notice)
    /// as opposed to inline degradation of the location line.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppError::Geolocation(_)
                | AppError::State(StateError::NoCurrentCity | StateError::UnitNotEnabled(_))
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
