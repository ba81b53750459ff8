//! Unit-dependent display strings derived from a fetched payload.
//!
//! [`format_for_display`] is a pure function of `(payload, unit)`: switching
//! units re-runs it against the stored payload instead of fetching again.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::air_quality::AirQualityLevel;
use crate::forecast::{local_time, select_daily, select_hourly, HOURLY_ENTRIES, MAX_DAILY_ENTRIES};
use crate::types::{offset_from_seconds, ForecastEntry, WeatherPayload};
use crate::units::{convert, round_half_up, symbol_for, MeasurementSystem, TemperatureUnit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub temp_max: String,
    pub temp_min: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub wind_speed: String,
    pub wind_direction: String,
    pub visibility: String,
    pub pressure: String,
    pub humidity: String,
    pub sunrise: String,
    pub sunset: String,
    /// Fetch time on the place's clock
    pub updated: String,
    pub daily: Vec<DailyView>,
    pub hourly: Option<HourlyTrend>,
    pub air_quality: Option<AirQualityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyView {
    /// e.g. "Mon 1"
    pub label: String,
    pub temperature: String,
    pub temp_min: String,
    pub condition: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyTrend {
    /// Series title, e.g. "Temperature (°C)"
    pub title: String,
    pub points: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    /// e.g. "3 PM"
    pub label: String,
    pub temperature: i64,
    pub precipitation_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityView {
    /// 1..=5
    pub index: u8,
    pub label: &'static str,
    pub color: &'static str,
    pub background: &'static str,
}

impl From<AirQualityLevel> for AirQualityView {
    fn from(level: AirQualityLevel) -> Self {
        Self {
            index: level.index(),
            label: level.label(),
            color: level.color(),
            background: level.background(),
        }
    }
}

/// Format a provider temperature (in `system`) for display in `unit`.
pub fn format_temperature(value: f64, system: MeasurementSystem, unit: TemperatureUnit) -> String {
    let shown = convert(system.to_celsius(value), unit);
    format!("{}{}", round_half_up(shown), symbol_for(unit))
}

fn format_wind(speed: f64, system: MeasurementSystem) -> String {
    match system {
        // metric answers in m/s
        MeasurementSystem::Metric => format!("{} km/h", round_half_up(speed * 3.6)),
        MeasurementSystem::Imperial => format!("{} mph", round_half_up(speed)),
    }
}

fn format_clock(timestamp: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.with_timezone(&offset).format("%I:%M %p").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn daily_view(entry: &ForecastEntry, offset: FixedOffset, system: MeasurementSystem, unit: TemperatureUnit) -> DailyView {
    let condition = entry.weather.first();
    DailyView {
        label: local_time(entry.dt, offset)
            .map(|t| t.format("%a %-d").to_string())
            .unwrap_or_default(),
        temperature: format_temperature(entry.main.temp, system, unit),
        temp_min: format_temperature(entry.main.temp_min, system, unit),
        condition: condition.map(|c| c.main.clone()).unwrap_or_default(),
        icon_url: condition.map(|c| c.icon_url()),
    }
}

fn hourly_point(entry: &ForecastEntry, offset: FixedOffset, system: MeasurementSystem, unit: TemperatureUnit) -> HourlyPoint {
    let pct = round_half_up(entry.pop.clamp(0.0, 1.0) * 100.0);
    HourlyPoint {
        label: local_time(entry.dt, offset)
            .map(|t| t.format("%-I %p").to_string())
            .unwrap_or_default(),
        temperature: round_half_up(convert(system.to_celsius(entry.main.temp), unit)),
        precipitation_pct: u8::try_from(pct).unwrap_or(100),
    }
}

/// Derive every unit-dependent string from `payload` without mutating it.
pub fn format_for_display(payload: &WeatherPayload, unit: TemperatureUnit) -> DisplayModel {
    let current = &payload.current;
    let system = payload.system;
    let offset = payload.offset();
    let condition = current.condition();

    let (daily, hourly) = match &payload.forecast {
        Some(forecast) => {
            let forecast_offset = offset_from_seconds(forecast.city.timezone);
            let daily = select_daily(forecast, MAX_DAILY_ENTRIES)
                .into_iter()
                .map(|e| daily_view(e, forecast_offset, system, unit))
                .collect();
            let points = select_hourly(forecast, HOURLY_ENTRIES)
                .iter()
                .map(|e| hourly_point(e, forecast_offset, system, unit))
                .collect();
            let hourly = HourlyTrend {
                title: format!("Temperature ({})", symbol_for(unit)),
                points,
            };
            (daily, Some(hourly))
        }
        None => (Vec::new(), None),
    };

    DisplayModel {
        location: current.name.clone(),
        temperature: format_temperature(current.main.temp, system, unit),
        feels_like: format_temperature(current.main.feels_like, system, unit),
        temp_max: format_temperature(current.main.temp_max, system, unit),
        temp_min: format_temperature(current.main.temp_min, system, unit),
        description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        icon_url: condition.map(|c| c.icon_url()),
        wind_speed: format_wind(current.wind.speed, system),
        wind_direction: format!("{}°", current.wind.deg),
        visibility: current
            .visibility
            .map(|m| format!("{:.1} km", f64::from(m) / 1000.0))
            .unwrap_or_else(|| "--".to_string()),
        pressure: format!("{} hPa", current.main.pressure),
        humidity: format!("{}%", current.main.humidity),
        sunrise: format_clock(current.sys.sunrise, offset),
        sunset: format_clock(current.sys.sunset, offset),
        updated: format_clock(payload.fetched_at.timestamp(), offset),
        daily,
        hourly,
        air_quality: payload.air_quality.map(AirQualityView::from),
    }
}
