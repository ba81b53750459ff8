//! The city and payload currently on screen. Lives for one run, never persisted.

use nimbus_weather::WeatherPayload;

pub const FETCH_ERROR_LABEL: &str = "Error fetching weather";

#[derive(Debug, Clone)]
struct Loaded {
    city: String,
    payload: WeatherPayload,
}

/// `Empty` until the first successful fetch, `Loaded` from then on. A failed
/// fetch only overrides the location label; the last payload stays.
#[derive(Debug, Clone, Default)]
pub struct WeatherSession {
    loaded: Option<Loaded>,
    failure_label: Option<String>,
}

impl WeatherSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace city and payload together and clear any failure label.
    pub fn set_current(&mut self, city: impl Into<String>, payload: WeatherPayload) {
        self.loaded = Some(Loaded {
            city: city.into(),
            payload,
        });
        self.failure_label = None;
    }

    pub fn current(&self) -> Option<(&str, &WeatherPayload)> {
        self.loaded
            .as_ref()
            .map(|l| (l.city.as_str(), &l.payload))
    }

    pub fn current_city(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.city.as_str())
    }

    pub fn record_failure(&mut self, label: impl Into<String>) {
        self.failure_label = Some(label.into());
    }

    /// What the location line should read right now.
    pub fn location_label(&self) -> Option<&str> {
        self.failure_label
            .as_deref()
            .or_else(|| self.current_city())
    }
}
