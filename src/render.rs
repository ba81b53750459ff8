//! Plain-text rendering of a [`DisplayModel`].

use std::fmt::Write;

use nimbus_state::{ColorScheme, ThemeMode};
use nimbus_weather::display::HourlyTrend;
use nimbus_weather::DisplayModel;

const RESET: &str = "\x1b[0m";
const BAR_WIDTH: usize = 20;

/// Accent color for headings in the resolved scheme.
fn accent(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Light => "\x1b[34m",
        ColorScheme::Dark => "\x1b[96m",
    }
}

pub struct View<'a> {
    pub model: &'a DisplayModel,
    pub scheme: ColorScheme,
    pub mode: ThemeMode,
    pub favorite: bool,
}

pub fn dashboard(view: &View<'_>) -> String {
    let model = view.model;
    let accent = accent(view.scheme);
    let star = if view.favorite { "★" } else { "☆" };
    let mut out = String::new();

    let _ = writeln!(out, "{accent}{} {star}{RESET}  {}", model.location, view.mode.icon());
    let _ = writeln!(out, "  {}  {}", model.temperature, model.description);
    let _ = writeln!(
        out,
        "  feels like {}  high {}  low {}",
        model.feels_like, model.temp_max, model.temp_min
    );
    let _ = writeln!(
        out,
        "  wind {} {}  visibility {}  pressure {}  humidity {}",
        model.wind_speed, model.wind_direction, model.visibility, model.pressure, model.humidity
    );
    let _ = writeln!(out, "  sunrise {}  sunset {}", model.sunrise, model.sunset);

    if let Some(aqi) = &model.air_quality {
        let _ = writeln!(out, "  air quality {} ({}/5)", aqi.label, aqi.index);
    }
    let _ = writeln!(out, "  updated {}", model.updated);

    if !model.daily.is_empty() {
        let _ = writeln!(out, "{accent}Forecast{RESET}");
        for day in &model.daily {
            let _ = writeln!(
                out,
                "  {:<7} {:>6} / {:<6} {}",
                day.label, day.temperature, day.temp_min, day.condition
            );
        }
    }

    if let Some(trend) = &model.hourly {
        hourly(&mut out, trend, accent);
    }

    out
}

fn hourly(out: &mut String, trend: &HourlyTrend, accent: &str) {
    let _ = writeln!(out, "{accent}{}{RESET}", trend.title);
    let min = trend.points.iter().map(|p| p.temperature).min().unwrap_or(0);
    let max = trend.points.iter().map(|p| p.temperature).max().unwrap_or(0);
    let span = (max - min).max(1);

    for point in &trend.points {
        let filled = usize::try_from((point.temperature - min) * BAR_WIDTH as i64 / span).unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:>5} {:>4} {:<width$} {:>3}% rain",
            point.label,
            point.temperature,
            "▇".repeat(filled.max(1)),
            point.precipitation_pct,
            width = BAR_WIDTH
        );
    }
}

/// Numbered list, or `empty` when there is nothing to show.
pub fn list(title: &str, items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("{title}: {empty}");
    }
    let mut out = format!("{title}:");
    for (i, item) in items.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}", i + 1, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_weather::display::{AirQualityView, HourlyPoint};

    fn model() -> DisplayModel {
        DisplayModel {
            location: "Paris".into(),
            temperature: "18°C".into(),
            feels_like: "17°C".into(),
            temp_max: "20°C".into(),
            temp_min: "16°C".into(),
            description: "clear sky".into(),
            icon_url: None,
            wind_speed: "11 km/h".into(),
            wind_direction: "90°".into(),
            visibility: "10.0 km".into(),
            pressure: "1015 hPa".into(),
            humidity: "55%".into(),
            sunrise: "07:10 AM".into(),
            sunset: "05:05 PM".into(),
            updated: "02:15 PM".into(),
            daily: Vec::new(),
            hourly: Some(HourlyTrend {
                title: "Temperature (°C)".into(),
                points: vec![
                    HourlyPoint { label: "3 PM".into(), temperature: 18, precipitation_pct: 0 },
                    HourlyPoint { label: "6 PM".into(), temperature: 14, precipitation_pct: 40 },
                ],
            }),
            air_quality: Some(AirQualityView {
                index: 4,
                label: "Poor",
                color: "#ff0000",
                background: "#ffe0e0",
            }),
        }
    }

    #[test]
    fn test_dashboard_marks_favorite() {
        let model = model();
        let text = dashboard(&View {
            model: &model,
            scheme: ColorScheme::Dark,
            mode: ThemeMode::Dark,
            favorite: true,
        });
        assert!(text.contains("Paris ★"));
        assert!(text.contains("18°C  clear sky"));
        assert!(text.contains("Temperature (°C)"));
        assert!(text.contains("40% rain"));
        assert!(text.contains("air quality Poor (4/5)"));
        assert!(text.contains("updated 02:15 PM"));
        assert!(!text.contains("Forecast"));
    }

    #[test]
    fn test_list_numbering() {
        assert_eq!(list("Favorites", &[], "none yet"), "Favorites: none yet");
        assert_eq!(
            list("Recent", &["Oslo".into(), "Paris".into()], "none"),
            "Recent:\n  1. Oslo\n  2. Paris"
        );
    }
}
