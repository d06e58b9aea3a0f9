use crate::{
    Config,
    model::{City, WeatherSnapshot},
    provider::{forecast::OpenMeteoForecast, geocoding::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod forecast;
pub mod geocoding;

/// Upper bound on suggestions returned for one query.
pub const MAX_SUGGESTIONS: usize = 5;

/// Shorter queries never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Resolves a partial city name into candidate cities.
///
/// Best effort: failures are logged and come back as an empty list.
#[async_trait]
pub trait CityLookup: Send + Sync + Debug {
    async fn lookup(&self, partial_name: &str) -> Vec<City>;
}

/// Fetches current conditions and the daily forecast for a coordinate.
///
/// `None` means the weather is unavailable; the reason has already been logged.
#[async_trait]
pub trait WeatherFetch: Send + Sync + Debug {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Option<WeatherSnapshot>;
}

/// Construct the city lookup client from config.
pub fn geocoder_from_config(config: &Config) -> Arc<dyn CityLookup> {
    Arc::new(OpenMeteoGeocoder::new(config.endpoints.geocoding_url.clone()))
}

/// Construct the weather client from config.
pub fn forecast_from_config(config: &Config) -> Arc<dyn WeatherFetch> {
    Arc::new(OpenMeteoForecast::new(config.endpoints.forecast_url.clone()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchable_needs_two_characters() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("a"));
        assert!(!is_searchable("é"));
        assert!(is_searchable("ab"));
        assert!(is_searchable("Lond"));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "ü".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn factories_use_configured_endpoints() {
        let mut cfg = Config::default();
        cfg.endpoints.geocoding_url = "http://localhost:1/geo".into();
        cfg.endpoints.forecast_url = "http://localhost:1/wx".into();

        let geocoder = format!("{:?}", geocoder_from_config(&cfg));
        let forecast = format!("{:?}", forecast_from_config(&cfg));
        assert!(geocoder.contains("http://localhost:1/geo"));
        assert!(forecast.contains("http://localhost:1/wx"));
    }
}
