//! Weather data for Nimbus
//!
//! Temperature units, the OpenWeatherMap client, IP geolocation and the
//! formatting that turns a fetched payload into display strings.

pub mod air_quality;
pub mod display;
pub mod forecast;
pub mod location;
pub mod provider;
pub mod types;
pub mod units;

pub use air_quality::AirQualityLevel;
pub use display::{format_for_display, DisplayModel};
pub use location::{IpLocator, Locator, NoLocator};
pub use provider::WeatherProvider;
pub use types::*;
pub use units::{convert, symbol_for, MeasurementSystem, TemperatureUnit, UnitSet};
