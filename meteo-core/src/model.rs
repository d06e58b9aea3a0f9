use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::icon::{IconCategory, classify};

/// A geocoding match, as returned by the city lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: String,
    /// First-level administrative region, e.g. a state or province.
    #[serde(default)]
    pub admin1: Option<String>,
}

impl City {
    /// Canonical "name, country" form shown once a city is picked.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn region_label(&self) -> String {
        match self.admin1.as_deref() {
            Some(region) if !region.is_empty() => format!("{region}, {}", self.country),
            _ => self.country.clone(),
        }
    }
}

/// A named point the dashboard fetches weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }

    /// Fallback city used when nothing else is configured.
    pub fn london() -> Self {
        Self::new("London", 51.5074, -0.1278)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::london()
    }
}

impl From<&City> for Location {
    fn from(city: &City) -> Self {
        Self::new(city.display_name(), city.latitude, city.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub weather_code: i32,
    pub wind_speed_kmh: f64,
    pub humidity_pct: f64,
    pub is_day: bool,
}

impl CurrentConditions {
    pub fn icon(&self) -> IconCategory {
        classify(self.weather_code, self.is_day)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error(
        "daily forecast series are misaligned: {dates} dates, {codes} weather codes, \
         {max} max temperatures, {min} min temperatures"
    )]
    MisalignedDaily { dates: usize, codes: usize, max: usize, min: usize },
}

/// Index-aligned daily series: element `i` of every sequence is the same day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    dates: Vec<NaiveDate>,
    weather_codes: Vec<i32>,
    temperature_max: Vec<f64>,
    temperature_min: Vec<f64>,
}

impl DailyForecast {
    pub fn new(
        dates: Vec<NaiveDate>,
        weather_codes: Vec<i32>,
        temperature_max: Vec<f64>,
        temperature_min: Vec<f64>,
    ) -> Result<Self, SnapshotError> {
        let n = dates.len();
        if weather_codes.len() != n || temperature_max.len() != n || temperature_min.len() != n {
            return Err(SnapshotError::MisalignedDaily {
                dates: n,
                codes: weather_codes.len(),
                max: temperature_max.len(),
                min: temperature_min.len(),
            });
        }

        Ok(Self { dates, weather_codes, temperature_max, temperature_min })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn weather_codes(&self) -> &[i32] {
        &self.weather_codes
    }

    pub fn temperature_max(&self) -> &[f64] {
        &self.temperature_max
    }

    pub fn temperature_min(&self) -> &[f64] {
        &self.temperature_min
    }

    pub fn days(&self) -> impl Iterator<Item = ForecastDay> + '_ {
        (0..self.len()).map(move |i| ForecastDay {
            date: self.dates[i],
            weather_code: self.weather_codes[i],
            temperature_max: self.temperature_max[i],
            temperature_min: self.temperature_min[i],
        })
    }
}

/// One row of a [`DailyForecast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temperature_max: f64,
    pub temperature_min: f64,
}

impl ForecastDay {
    /// Forecast rows always use the daytime icon variant.
    pub fn icon(&self) -> IconCategory {
        classify(self.weather_code, true)
    }
}

/// Current conditions plus the daily forecast from one successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub daily: DailyForecast,
}
