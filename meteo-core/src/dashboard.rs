//! Request lifecycle behind the weather dashboard.

use std::{collections::HashMap, sync::Arc};

use tokio::task::{self, JoinSet};

use crate::{
    model::{City, Location, WeatherSnapshot},
    provider::WeatherFetch,
};

pub const FETCH_FAILED: &str = "Failed to fetch weather data.";
pub const UNEXPECTED_ERROR: &str = "An error occurred.";

/// How a finished request changed the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Updated,
    /// The client reported the weather as unavailable.
    Unavailable,
    /// The request task itself blew up.
    Failed,
}

/// What the dashboard should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashboardView<'a> {
    Loading,
    Error(&'a str),
    Ready { city: &'a str, snapshot: &'a WeatherSnapshot },
    Empty,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    location: Location,
}

/// Tracks loading, error and data state for the weather display.
///
/// Every request bumps a generation counter. Older requests keep running but
/// their results are discarded once a newer request has been issued.
#[derive(Debug)]
pub struct DashboardController {
    weather: Arc<dyn WeatherFetch>,
    default_location: Location,
    city_name: String,
    snapshot: Option<Arc<WeatherSnapshot>>,
    loading: bool,
    error: Option<&'static str>,
    generation: u64,
    tasks: JoinSet<Option<WeatherSnapshot>>,
    in_flight: HashMap<task::Id, InFlight>,
}

impl DashboardController {
    pub fn new(weather: Arc<dyn WeatherFetch>, default_location: Location) -> Self {
        Self {
            weather,
            city_name: default_location.name.clone(),
            default_location,
            snapshot: None,
            loading: false,
            error: None,
            generation: 0,
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn default_location(&self) -> &Location {
        &self.default_location
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        self.snapshot.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Kick off the first request, for the default location.
    pub fn activate(&mut self) {
        self.request(self.default_location.clone());
    }

    pub fn select_city(&mut self, city: &City) {
        self.request(Location::from(city));
    }

    /// Start fetching weather for `location`. Must be called from within a
    /// Tokio runtime; drive completion with [`next_update`](Self::next_update).
    pub fn request(&mut self, location: Location) {
        self.generation += 1;
        self.loading = true;
        self.error = None;

        tracing::debug!(generation = self.generation, location = %location.name, "requesting weather");

        let weather = Arc::clone(&self.weather);
        let (latitude, longitude) = (location.latitude, location.longitude);
        let handle = self.tasks.spawn(async move { weather.fetch(latitude, longitude).await });

        self.in_flight.insert(handle.id(), InFlight { generation: self.generation, location });
    }

    /// Wait for the newest request to finish and apply its result.
    ///
    /// Returns `None` once no request is left in flight.
    pub async fn next_update(&mut self) -> Option<FetchOutcome> {
        loop {
            let (id, result) = match self.tasks.join_next_with_id().await? {
                Ok((id, snapshot)) => (id, Ok(snapshot)),
                Err(err) => (err.id(), Err(err)),
            };

            let Some(request) = self.in_flight.remove(&id) else {
                continue;
            };

            if request.generation != self.generation {
                tracing::debug!(
                    stale = request.generation,
                    current = self.generation,
                    location = %request.location.name,
                    "discarding superseded weather response"
                );
                continue;
            }

            self.loading = false;

            let outcome = match result {
                Ok(Some(snapshot)) => {
                    self.snapshot = Some(Arc::new(snapshot));
                    self.city_name = request.location.name;
                    FetchOutcome::Updated
                }
                Ok(None) => {
                    self.error = Some(FETCH_FAILED);
                    FetchOutcome::Unavailable
                }
                Err(err) => {
                    tracing::error!(location = %request.location.name, "weather request failed: {err}");
                    self.error = Some(UNEXPECTED_ERROR);
                    FetchOutcome::Failed
                }
            };

            return Some(outcome);
        }
    }

    /// Request `location` and wait until it has been applied.
    pub async fn refresh(&mut self, location: Location) -> FetchOutcome {
        self.request(location);
        self.next_update().await.unwrap_or(FetchOutcome::Failed)
    }

    /// Loading wins over errors, and an error hides any retained snapshot.
    pub fn view(&self) -> DashboardView<'_> {
        if self.loading {
            return DashboardView::Loading;
        }
        if let Some(message) = self.error {
            return DashboardView::Error(message);
        }
        match self.snapshot.as_deref() {
            Some(snapshot) => DashboardView::Ready { city: &self.city_name, snapshot },
            None => DashboardView::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, DailyForecast};
    use async_trait::async_trait;
    use std::{sync::Mutex, time::Duration};

    /// Reports the requested latitude as the temperature.
    /// Latitude 0 is unavailable, latitude above 90 panics,
    /// and a positive longitude is the response delay in milliseconds.
    #[derive(Debug, Default)]
    struct ScriptedWeather {
        calls: Mutex<Vec<(f64, f64)>>,
    }

    impl ScriptedWeather {
        fn calls(&self) -> Vec<(f64, f64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherFetch for ScriptedWeather {
        async fn fetch(&self, latitude: f64, longitude: f64) -> Option<WeatherSnapshot> {
            self.calls.lock().unwrap().push((latitude, longitude));
            if longitude > 0.0 {
                tokio::time::sleep(Duration::from_millis(longitude as u64)).await;
            }
            if latitude > 90.0 {
                panic!("scripted failure");
            }
            if latitude == 0.0 {
                return None;
            }
            Some(WeatherSnapshot {
                current: CurrentConditions {
                    temperature_c: latitude,
                    weather_code: 0,
                    wind_speed_kmh: 5.0,
                    humidity_pct: 60.0,
                    is_day: true,
                },
                daily: DailyForecast::new(vec![], vec![], vec![], vec![]).expect("empty is aligned"),
            })
        }
    }

    fn dashboard(weather: &Arc<ScriptedWeather>) -> DashboardController {
        DashboardController::new(weather.clone(), Location::london())
    }

    fn temperature(dash: &DashboardController) -> f64 {
        dash.snapshot().expect("snapshot present").current.temperature_c
    }

    #[tokio::test]
    async fn activate_fetches_default_location() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);
        assert_eq!(dash.view(), DashboardView::Empty);

        dash.activate();
        assert!(dash.is_loading());
        assert_eq!(dash.view(), DashboardView::Loading);

        assert_eq!(dash.next_update().await, Some(FetchOutcome::Updated));
        assert!(!dash.is_loading());
        assert_eq!(dash.city_name(), "London");
        assert_eq!(weather.calls(), vec![(51.5074, -0.1278)]);
        assert!(matches!(dash.view(), DashboardView::Ready { city: "London", .. }));
    }

    #[tokio::test]
    async fn selecting_a_city_updates_the_name() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);

        let lyon = City {
            id: 2996944,
            name: "Lyon".into(),
            latitude: 45.75,
            longitude: -4.85,
            country: "France".into(),
            admin1: Some("Auvergne-Rhône-Alpes".into()),
        };
        dash.select_city(&lyon);

        assert_eq!(dash.next_update().await, Some(FetchOutcome::Updated));
        assert_eq!(dash.city_name(), "Lyon, France");
        assert_eq!(temperature(&dash), 45.75);
        assert_eq!(weather.calls(), vec![(45.75, -4.85)]);
    }

    #[tokio::test]
    async fn unavailable_weather_keeps_last_snapshot_behind_error() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);

        dash.refresh(Location::new("Oslo", 59.9, -10.7)).await;
        let outcome = dash.refresh(Location::new("Null Island", 0.0, -1.0)).await;

        assert_eq!(outcome, FetchOutcome::Unavailable);
        assert_eq!(dash.error(), Some(FETCH_FAILED));
        assert_eq!(dash.view(), DashboardView::Error(FETCH_FAILED));
        assert_eq!(dash.city_name(), "Oslo");
        assert_eq!(temperature(&dash), 59.9);
    }

    #[tokio::test]
    async fn panicking_fetch_reports_generic_error() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);

        let outcome = dash.refresh(Location::new("Nowhere", 95.0, -1.0)).await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(dash.error(), Some(UNEXPECTED_ERROR));
        assert!(!dash.is_loading());
        assert!(dash.snapshot().is_none());
    }

    #[tokio::test]
    async fn new_request_clears_previous_error() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);

        dash.refresh(Location::new("Null Island", 0.0, -1.0)).await;
        assert!(dash.error().is_some());

        dash.request(Location::new("Rome", 41.9, -12.5));
        assert!(dash.error().is_none());
        assert_eq!(dash.view(), DashboardView::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_superseded_response_is_discarded() {
        let weather = Arc::new(ScriptedWeather::default());
        let mut dash = dashboard(&weather);

        dash.request(Location::new("Slow", 10.0, 500.0));
        dash.request(Location::new("Fast", 20.0, 10.0));

        assert_eq!(dash.next_update().await, Some(FetchOutcome::Updated));
        assert_eq!(dash.city_name(), "Fast");
        assert!(!dash.is_loading());

        // The slow request still completes but changes nothing.
        assert_eq!(dash.next_update().await, None);
        assert_eq!(dash.city_name(), "Fast");
        assert_eq!(temperature(&dash), 20.0);
        assert_eq!(weather.calls().len(), 2);
    }
}
