//! Temperature units and conversions.
//!
//! Celsius is the canonical unit: every reading is normalized to Celsius
//! before being converted to the unit the user asked to see.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
            Self::Kelvin => "kelvin",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown temperature unit: {0}")]
pub struct UnknownUnit(pub String);

impl FromStr for TemperatureUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "celsius" => Ok(Self::Celsius),
            "fahrenheit" => Ok(Self::Fahrenheit),
            "kelvin" => Ok(Self::Kelvin),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

/// Convert a Celsius reading to `to`. No rounding and no bounds checking.
pub fn convert(celsius: f64, to: TemperatureUnit) -> f64 {
    match to {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        TemperatureUnit::Kelvin => celsius + 273.15,
    }
}

/// Inverse of the Fahrenheit transform, used to normalize imperial readings.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Short glyph shown next to a temperature.
pub fn symbol_for(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "°C",
        TemperatureUnit::Fahrenheit => "°F",
        TemperatureUnit::Kelvin => "K",
    }
}

/// Round to the nearest integer with halves going toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// The units a build of the dashboard offers, in cycle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSet {
    units: Vec<TemperatureUnit>,
}

impl UnitSet {
    /// Celsius, Fahrenheit and Kelvin.
    pub fn full() -> Self {
        Self {
            units: vec![
                TemperatureUnit::Celsius,
                TemperatureUnit::Fahrenheit,
                TemperatureUnit::Kelvin,
            ],
        }
    }

    /// Celsius and Fahrenheit only.
    pub fn reduced() -> Self {
        Self {
            units: vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit],
        }
    }

    pub fn with_kelvin(kelvin: bool) -> Self {
        if kelvin {
            Self::full()
        } else {
            Self::reduced()
        }
    }

    pub fn contains(&self, unit: TemperatureUnit) -> bool {
        self.units.contains(&unit)
    }

    pub fn units(&self) -> &[TemperatureUnit] {
        &self.units
    }

    /// Successor of `unit`, wrapping. Units outside the set restart at the first entry.
    pub fn next(&self, unit: TemperatureUnit) -> TemperatureUnit {
        match self.units.iter().position(|u| *u == unit) {
            Some(i) => self.units[(i + 1) % self.units.len()],
            None => self.units[0],
        }
    }
}

impl Default for UnitSet {
    fn default() -> Self {
        Self::full()
    }
}

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    Metric,
    Imperial,
}

impl MeasurementSystem {
    /// Metric for Celsius; everything else is fetched imperial. Kelvin is
    /// derived locally from the normalized Celsius value.
    pub fn for_unit(unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Celsius => Self::Metric,
            _ => Self::Imperial,
        }
    }

    /// Query parameter value for the provider's `units` argument.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Normalize a provider temperature in this system to Celsius.
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Metric => value,
            Self::Imperial => fahrenheit_to_celsius(value),
        }
    }
}
