use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::City,
    provider::{CityLookup, MAX_SUGGESTIONS, is_searchable, truncate_body},
};

/// City search backed by the Open-Meteo geocoding API.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    url: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }

    async fn search(&self, name: &str) -> Result<Vec<City>> {
        let count = MAX_SUGGESTIONS.to_string();

        tracing::debug!(query = name, url = %self.url, "searching cities");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo geocoding")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GeoResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        // No `results` key means no match.
        let mut cities = parsed.results.unwrap_or_default();
        cities.truncate(MAX_SUGGESTIONS);

        Ok(cities)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<City>>,
}

#[async_trait]
impl CityLookup for OpenMeteoGeocoder {
    async fn lookup(&self, partial_name: &str) -> Vec<City> {
        if !is_searchable(partial_name) {
            return Vec::new();
        }

        match self.search(partial_name).await {
            Ok(cities) => cities,
            Err(err) => {
                tracing::warn!(query = partial_name, "city search failed: {err:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn city_json(id: i64, name: &str, country: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "latitude": 51.5,
            "longitude": -0.12,
            "country": country,
            "admin1": "England",
            "timezone": "Europe/London",
        })
    }

    fn geocoder(server: &MockServer) -> OpenMeteoGeocoder {
        OpenMeteoGeocoder::new(format!("{}/v1/search", server.uri()))
    }

    #[tokio::test]
    async fn short_queries_never_hit_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = geocoder(&server);
        assert!(client.lookup("").await.is_empty());
        assert!(client.lookup("a").await.is_empty());
    }

    #[tokio::test]
    async fn results_are_capped_in_collaborator_order() {
        let server = MockServer::start().await;
        let results: Vec<_> =
            (1..=7).map(|i| city_json(i, &format!("London {i}"), "United Kingdom")).collect();

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Lond"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cities = geocoder(&server).lookup("Lond").await;

        assert_eq!(cities.len(), 5);
        let ids: Vec<i64> = cities.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(cities[0].admin1.as_deref(), Some("England"));
    }

    #[tokio::test]
    async fn missing_results_field_means_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "generationtime_ms": 0.4 })),
            )
            .mount(&server)
            .await;

        assert!(geocoder(&server).lookup("Xyzzy").await.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
            .mount(&server)
            .await;

        assert!(geocoder(&server).lookup("Paris").await.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        assert!(geocoder(&server).lookup("Paris").await.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_absorbed() {
        // Nothing listens on port 9 locally.
        let client = OpenMeteoGeocoder::new("http://127.0.0.1:9/v1/search");
        assert!(client.lookup("Paris").await.is_empty());
    }
}
