use std::fmt::{self, Write as _};

use meteo_core::{City, CurrentConditions, DailyForecast, DashboardView, IconCategory};

/// A city as listed in the selection prompt.
pub struct CityChoice(pub City);

impl fmt::Display for CityChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.name, self.0.region_label())
    }
}

pub fn icon_glyph(icon: IconCategory) -> &'static str {
    match icon {
        IconCategory::ClearDay => "☀",
        IconCategory::ClearNight => "☾",
        IconCategory::PartlyCloudyDay => "⛅",
        IconCategory::PartlyCloudyNight => "☁",
        IconCategory::Fog => "≡",
        IconCategory::Rain => "☂",
        IconCategory::Snow => "❄",
        IconCategory::Thunderstorm => "⚡",
        IconCategory::Unknown => "?",
    }
}

pub fn dashboard(view: &DashboardView<'_>) -> String {
    match view {
        DashboardView::Loading => "Loading weather data...".to_string(),
        DashboardView::Error(message) => format!("! {message}"),
        DashboardView::Empty => "No weather data yet.".to_string(),
        DashboardView::Ready { city, snapshot } => {
            format!("{}\n\n{}", current(city, &snapshot.current), forecast(&snapshot.daily))
        }
    }
}

fn current(city: &str, current: &CurrentConditions) -> String {
    let icon = current.icon();
    format!(
        "{city}  {} {icon}\n{:.0}°  Wind {} km/h  Humidity {:.0}%",
        icon_glyph(icon),
        current.temperature_c.round(),
        current.wind_speed_kmh,
        current.humidity_pct,
    )
}

fn forecast(daily: &DailyForecast) -> String {
    let mut out = format!("{}-Day Forecast", daily.len());
    for day in daily.days() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n  {}  {}  {:>3.0}°  {:>3.0}°",
            day.date.format("%a"),
            icon_glyph(day.icon()),
            day.temperature_max.round(),
            day.temperature_min.round(),
        );
    }
    out
}

pub fn suggestions(cities: &[City]) -> String {
    if cities.is_empty() {
        return "  (no matches)".to_string();
    }

    cities
        .iter()
        .enumerate()
        .map(|(i, city)| format!("  {}. {} ({})", i + 1, city.name, city.region_label()))
        .collect::<Vec<_>>()
        .join("\n")
}
