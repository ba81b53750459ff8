//! Persisted unit/theme preferences.
//!
//! Every setter writes through to storage before returning and notifies
//! subscribers, even when the value did not change. Storage failures are
//! logged; the in-memory value is updated regardless.

use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;

use nimbus_weather::{TemperatureUnit, UnitSet};

use crate::error::StateError;
use crate::storage::{KeyValueStore, KEY_HAS_SEARCHED, KEY_TEMPERATURE_UNIT, KEY_THEME};
use crate::theme::ThemeMode;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceEvent {
    UnitChanged(TemperatureUnit),
    ThemeChanged(ThemeMode),
}

pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    units: UnitSet,
    unit: TemperatureUnit,
    theme: ThemeMode,
    events: broadcast::Sender<PreferenceEvent>,
}

impl PreferenceStore {
    /// Load from storage, substituting defaults for absent or malformed values.
    pub fn load(store: Arc<dyn KeyValueStore>, units: UnitSet) -> Self {
        let unit = load_value(store.as_ref(), KEY_TEMPERATURE_UNIT)
            .and_then(|raw| match TemperatureUnit::from_str(&raw) {
                Ok(u) if units.contains(u) => Some(u),
                Ok(u) => {
                    warn_malformed(KEY_TEMPERATURE_UNIT, &format!("{u} is not enabled"));
                    None
                }
                Err(e) => {
                    warn_malformed(KEY_TEMPERATURE_UNIT, &e.to_string());
                    None
                }
            })
            .unwrap_or_default();

        let theme = load_value(store.as_ref(), KEY_THEME)
            .and_then(|raw| match ThemeMode::from_str(&raw) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn_malformed(KEY_THEME, &e);
                    None
                }
            })
            .unwrap_or_default();

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        tracing::debug!("Loaded preferences: unit={}, theme={}", unit, theme);

        Self {
            store,
            units,
            unit,
            theme,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PreferenceEvent> {
        self.events.subscribe()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// # Errors
    ///
    /// `UnitNotEnabled` when `unit` is outside the configured set; nothing
    /// is stored or broadcast in that case.
    pub fn set_unit(&mut self, unit: TemperatureUnit) -> Result<(), StateError> {
        if !self.units.contains(unit) {
            tracing::warn!("Ignoring unit {}: not enabled", unit);
            return Err(StateError::UnitNotEnabled(unit));
        }
        self.apply_unit(unit);
        Ok(())
    }

    /// Advance to the next enabled unit, wrapping.
    pub fn cycle_unit(&mut self) -> TemperatureUnit {
        let next = self.units.next(self.unit);
        self.apply_unit(next);
        next
    }

    fn apply_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        self.persist(KEY_TEMPERATURE_UNIT, unit.as_str());
        self.notify(PreferenceEvent::UnitChanged(unit));
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.persist(KEY_THEME, theme.as_str());
        self.notify(PreferenceEvent::ThemeChanged(theme));
    }

    pub fn cycle_theme(&mut self) -> ThemeMode {
        let next = self.theme.next();
        self.set_theme(next);
        next
    }

    /// Whether a search or auto-geolocation has ever happened.
    pub fn has_searched(&self) -> bool {
        match self.store.get(KEY_HAS_SEARCHED) {
            Ok(value) => value.is_some(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", KEY_HAS_SEARCHED, e);
                false
            }
        }
    }

    pub fn mark_searched(&self) {
        self.persist(KEY_HAS_SEARCHED, "true");
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn notify(&self, event: PreferenceEvent) {
        // Err only means nobody is listening
        let _ = self.events.send(event);
    }
}

fn load_value(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

fn warn_malformed(key: &str, reason: &str) {
    let err = StateError::MalformedStoredPreference {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    tracing::warn!("{}; using the default", err);
}
