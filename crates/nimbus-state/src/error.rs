//! State-layer error types.

use thiserror::Error;

use nimbus_weather::TemperatureUnit;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("No current city")]
    NoCurrentCity,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Malformed stored value for {key}: {reason}")]
    MalformedStoredPreference { key: String, reason: String },

    #[error("Unit {0} is not enabled")]
    UnitNotEnabled(TemperatureUnit),
}

impl StateError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoCurrentCity => "Please search for a city first",
            Self::Storage(_) => "Failed to save your preferences. Changes last until you quit.",
            Self::MalformedStoredPreference { .. } => "A saved preference was unreadable and has been reset.",
            Self::UnitNotEnabled(_) => "That temperature unit is not available.",
        }
    }
}

impl From<rusqlite::Error> for StateError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
