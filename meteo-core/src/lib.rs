//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - City lookup and weather clients for Open-Meteo
//! - The debounced search box and the dashboard request lifecycle
//! - Shared domain models (cities, snapshots, icon categories)
//!
//! It is used by `meteo-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod icon;
pub mod model;
pub mod provider;
pub mod search;

pub use config::Config;
pub use dashboard::{DashboardController, DashboardView, FetchOutcome};
pub use icon::{IconCategory, classify};
pub use model::{City, CurrentConditions, DailyForecast, ForecastDay, Location, WeatherSnapshot};
pub use provider::{CityLookup, WeatherFetch};
pub use search::{SearchInteraction, SearchState};
