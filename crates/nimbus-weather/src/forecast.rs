//! Picking the daily and hourly views out of a 3-hour forecast.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::HashSet;

use crate::types::{offset_from_seconds, Forecast, ForecastEntry};

pub const MAX_DAILY_ENTRIES: usize = 5;
/// 8 steps of 3 hours
pub const HOURLY_ENTRIES: usize = 8;

/// Local time of a forecast step in the given offset.
pub fn local_time(dt: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(dt, 0).map(|utc| utc.with_timezone(&offset))
}

/// The first entry of each calendar day (in the city's offset), at most `max` days.
pub fn select_daily(forecast: &Forecast, max: usize) -> Vec<&ForecastEntry> {
    let offset = offset_from_seconds(forecast.city.timezone);
    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut days = Vec::new();

    for entry in &forecast.list {
        if days.len() >= max {
            break;
        }
        let Some(local) = local_time(entry.dt, offset) else {
            tracing::debug!("Skipping forecast entry with invalid timestamp {}", entry.dt);
            continue;
        };
        if seen.insert(local.date_naive()) {
            days.push(entry);
        }
    }

    days
}

/// The first `count` entries, roughly the next 24 hours for the default count.
pub fn select_hourly(forecast: &Forecast, count: usize) -> &[ForecastEntry] {
    let end = forecast.list.len().min(count);
    &forecast.list[..end]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Condition, ForecastCity, Readings};

    pub(crate) fn entry(dt: i64, temp: f64, pop: f64) -> ForecastEntry {
        ForecastEntry {
            dt,
            main: Readings {
                temp,
                feels_like: temp,
                temp_min: temp - 1.0,
                temp_max: temp + 1.0,
                pressure: 1010,
                humidity: 60,
            },
            weather: vec![Condition {
                id: 500,
                main: "Rain".into(),
                description: "light rain".into(),
                icon: "10d".into(),
            }],
            pop,
        }
    }

    /// Six days of 3-hour steps starting at 2024-01-01T00:00:00Z.
    pub(crate) fn six_day_forecast(timezone: i32) -> Forecast {
        let start = 1_704_067_200;
        let list = (0..48)
            .map(|i| entry(start + i * 3 * 3600, 10.0 + i as f64 * 0.1, 0.25))
            .collect();
        Forecast {
            list,
            city: ForecastCity {
                name: "Oslo".into(),
                timezone,
            },
        }
    }

    #[test]
    fn test_one_entry_per_day_capped() {
        let forecast = six_day_forecast(0);
        let days = select_daily(&forecast, MAX_DAILY_ENTRIES);
        assert_eq!(days.len(), 5);

        let dates: HashSet<NaiveDate> = days
            .iter()
            .filter_map(|e| local_time(e.dt, offset_from_seconds(0)))
            .map(|t| t.date_naive())
            .collect();
        assert_eq!(dates.len(), 5);
        // First entry of each day is midnight UTC
        assert_eq!(days[1].dt - days[0].dt, 24 * 3600);
    }

    #[test]
    fn test_daily_uses_city_offset() {
        // At UTC-5 the first step (00:00Z) belongs to the previous local day
        let forecast = six_day_forecast(-5 * 3600);
        let days = select_daily(&forecast, MAX_DAILY_ENTRIES);
        assert_eq!(days[0].dt, forecast.list[0].dt);
        assert_eq!(days[1].dt, forecast.list[2].dt);
    }

    #[test]
    fn test_hourly_takes_first_eight() {
        let forecast = six_day_forecast(0);
        let hourly = select_hourly(&forecast, HOURLY_ENTRIES);
        assert_eq!(hourly.len(), 8);
        assert_eq!(hourly[0].dt, forecast.list[0].dt);
    }

    #[test]
    fn test_short_forecast() {
        let mut forecast = six_day_forecast(0);
        forecast.list.truncate(3);
        assert_eq!(select_hourly(&forecast, HOURLY_ENTRIES).len(), 3);
        assert_eq!(select_daily(&forecast, MAX_DAILY_ENTRIES).len(), 1);
    }
}
