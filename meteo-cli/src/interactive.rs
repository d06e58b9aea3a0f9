//! Line-based live session: each line replaces the search text, `:N` picks
//! suggestion N and loads its weather.

use anyhow::{Context, Result};
use meteo_core::{
    Config, DashboardController, SearchInteraction, SearchState,
    provider::{forecast_from_config, geocoder_from_config},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const HELP: &str = "Type a city name to search. \
    :N picks suggestion N, :x closes the list, :? shows this help, :q quits.";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Select(usize),
    Dismiss,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);

    match line.trim() {
        ":q" | ":quit" => Input::Quit,
        ":x" => Input::Dismiss,
        ":?" | ":help" => Input::Help,
        cmd => match cmd.strip_prefix(':').and_then(|n| n.parse().ok()) {
            Some(n) => Input::Select(n),
            None => Input::Query(line.to_string()),
        },
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let mut search = SearchInteraction::new(geocoder_from_config(config), config.search.debounce());
    let mut dashboard =
        DashboardController::new(forecast_from_config(config), config.default_location.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    dashboard.activate();
    println!("{}", render::dashboard(&dashboard.view()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Help => println!("{HELP}"),
                    Input::Dismiss => search.dismiss(),
                    Input::Query(text) => search.input(text),
                    Input::Select(n) => match n.checked_sub(1).and_then(|i| search.select(i)) {
                        Some(city) => {
                            println!("> {}", search.query());
                            dashboard.select_city(&city);
                            println!("{}", render::dashboard(&dashboard.view()));
                        }
                        None => println!("No suggestion #{n}."),
                    },
                }
            }

            state = search.next_update(), if search.is_awaiting_results() => {
                if state == SearchState::SuggestionsOpen {
                    println!("{}", render::suggestions(search.suggestions()));
                }
            }

            Some(_) = dashboard.next_update(), if dashboard.is_loading() => {
                println!("{}", render::dashboard(&dashboard.view()));
            }
        }
    }

    Ok(())
}
