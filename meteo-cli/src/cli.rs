use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use meteo_core::{
    City, CityLookup, Config, DashboardController, DashboardView, Location,
    provider::{MIN_QUERY_CHARS, forecast_from_config, geocoder_from_config, is_searchable},
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "City search and weather dashboard")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose the city the dashboard opens with.
    Configure,

    /// Show current weather and the 7-day forecast.
    Show {
        /// City name; the configured default location when absent.
        query: Option<String>,

        /// Take the first match instead of asking.
        #[arg(long)]
        first: bool,
    },

    /// List cities matching a name.
    Search {
        /// At least two characters of a city name.
        query: String,
    },

    /// Type to search, pick a suggestion to switch the dashboard.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        tracing::debug!(?config, "configuration loaded");

        match self.command {
            Command::Configure => configure(config).await,
            Command::Show { query, first } => show(&config, query.as_deref(), first).await,
            Command::Search { query } => search(&config, &query).await,
            Command::Interactive => interactive::run(&config).await,
        }
    }
}

async fn configure(mut config: Config) -> Result<()> {
    let name = Text::new("Default city:")
        .with_initial_value(&config.default_location.name)
        .prompt()
        .context("Failed to read city name")?;

    let city = pick_city(&config, name.trim(), false).await?;
    config.set_default_location(&city);
    let path = config.save()?;

    println!("Default location set to {} ({})", config.default_location.name, path.display());
    Ok(())
}

async fn show(config: &Config, query: Option<&str>, first: bool) -> Result<()> {
    let location = match query {
        Some(query) => Location::from(&pick_city(config, query, first).await?),
        None => config.default_location.clone(),
    };

    let mut dashboard =
        DashboardController::new(forecast_from_config(config), config.default_location.clone());
    dashboard.refresh(location).await;

    match dashboard.view() {
        DashboardView::Error(message) => Err(anyhow!("{message}")),
        view => {
            println!("{}", render::dashboard(&view));
            Ok(())
        }
    }
}

async fn search(config: &Config, query: &str) -> Result<()> {
    ensure_searchable(query)?;

    let cities = geocoder_from_config(config).lookup(query).await;
    println!("{}", render::suggestions(&cities));
    Ok(())
}

/// Look `query` up and settle on one city, prompting when it is ambiguous.
async fn pick_city(config: &Config, query: &str, first: bool) -> Result<City> {
    ensure_searchable(query)?;

    let mut cities = geocoder_from_config(config).lookup(query).await;
    if cities.is_empty() {
        bail!("No cities found matching '{query}'.");
    }
    if first || cities.len() == 1 {
        return Ok(cities.swap_remove(0));
    }

    let choices = cities.into_iter().map(render::CityChoice).collect();
    let choice = Select::new("Which one?", choices)
        .prompt()
        .context("Failed to read city choice")?;

    Ok(choice.0)
}

fn ensure_searchable(query: &str) -> Result<()> {
    if !is_searchable(query) {
        bail!("Type at least {MIN_QUERY_CHARS} characters to search for a city.");
    }
    Ok(())
}
