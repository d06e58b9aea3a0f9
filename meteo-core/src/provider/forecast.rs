use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, Timelike};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{CurrentConditions, DailyForecast, WeatherSnapshot},
    provider::{WeatherFetch, truncate_body},
};

const HOURLY_FIELDS: &str = "relativehumidity_2m,is_day";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";

/// Current conditions and 7-day forecast from the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    url: String,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }

    async fn fetch_snapshot(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        tracing::debug!(latitude, longitude, url = %self.url, "fetching forecast");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current_weather", "true"),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo forecast")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        // Assumes the hourly series starts at local midnight of today, which
        // only holds while `timezone=auto` matches this machine's timezone.
        let hour = Local::now().hour() as usize;

        parsed.into_snapshot(hour)
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    weathercode: i32,
    windspeed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weathercode: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: OmCurrentWeather,
    #[serde(default)]
    hourly: OmHourly,
    daily: OmDaily,
}

impl OmForecastResponse {
    /// Build a snapshot, reading hourly humidity and day flag at `hour`.
    fn into_snapshot(self, hour: usize) -> Result<WeatherSnapshot> {
        let humidity_pct = self
            .hourly
            .relativehumidity_2m
            .get(hour)
            .copied()
            .flatten()
            .unwrap_or(0.0);

        let is_day = self.hourly.is_day.get(hour).copied().flatten().unwrap_or(1) != 0;

        let dates = self
            .daily
            .time
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid forecast date '{d}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        let daily = DailyForecast::new(
            dates,
            self.daily.weathercode,
            self.daily.temperature_2m_max,
            self.daily.temperature_2m_min,
        )?;

        Ok(WeatherSnapshot {
            current: CurrentConditions {
                temperature_c: self.current_weather.temperature,
                weather_code: self.current_weather.weathercode,
                wind_speed_kmh: self.current_weather.windspeed,
                humidity_pct,
                is_day,
            },
            daily,
        })
    }
}

#[async_trait]
impl WeatherFetch for OpenMeteoForecast {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Option<WeatherSnapshot> {
        match self.fetch_snapshot(latitude, longitude).await {
            Ok(snapshot) => {
                tracing::info!(latitude, longitude, days = snapshot.daily.len(), "forecast fetched");
                Some(snapshot)
            }
            Err(err) => {
                tracing::warn!(latitude, longitude, "weather fetch failed: {err:#}");
                None
            }
        }
    }
}
