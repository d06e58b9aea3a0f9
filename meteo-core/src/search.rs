//! Debounced city search box.
//!
//! Keystrokes replace the query and restart a single debounce timer. When the
//! timer fires the lookup runs on a spawned task and its result comes back
//! through a channel, tagged with the generation of the query that produced
//! it. Anything older than the current generation is dropped.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    model::City,
    provider::{CityLookup, is_searchable},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(crate::config::DEFAULT_DEBOUNCE_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing typed yet.
    Idle,
    /// Waiting for the debounce timer or the lookup.
    Pending,
    SuggestionsOpen,
    Closed,
}

#[derive(Debug)]
struct SuggestionBatch {
    generation: u64,
    /// `None` when the query was too short to search.
    cities: Option<Vec<City>>,
}

#[derive(Debug)]
pub struct SearchInteraction {
    lookup: Arc<dyn CityLookup>,
    debounce: Duration,
    query: String,
    suggestions: Vec<City>,
    state: SearchState,
    generation: u64,
    awaiting: bool,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SuggestionBatch>,
    rx: mpsc::UnboundedReceiver<SuggestionBatch>,
}

impl SearchInteraction {
    pub fn new(lookup: Arc<dyn CityLookup>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            lookup,
            debounce,
            query: String::new(),
            suggestions: Vec::new(),
            state: SearchState::Idle,
            generation: 0,
            awaiting: false,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[City] {
        &self.suggestions
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SearchState::SuggestionsOpen
    }

    /// True while a lookup for the current query has not landed yet.
    pub fn is_awaiting_results(&self) -> bool {
        self.awaiting
    }

    /// Replace the query text and (re)start the debounce timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn input(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.generation += 1;
        self.cancel_pending();
        self.state = SearchState::Pending;
        self.awaiting = true;

        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        let query = self.query.clone();
        let generation = self.generation;
        let delay = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let cities = if is_searchable(&query) {
                Some(lookup.lookup(&query).await)
            } else {
                None
            };

            // The receiver lives as long as the interaction itself.
            let _ = tx.send(SuggestionBatch { generation, cities });
        }));
    }

    /// Wait for the current lookup to land and apply it.
    ///
    /// Only resolves while [`is_awaiting_results`](Self::is_awaiting_results)
    /// is true; results of superseded queries are skipped. Cancel safe.
    pub async fn next_update(&mut self) -> SearchState {
        while let Some(batch) = self.rx.recv().await {
            if self.apply(batch) {
                break;
            }
        }
        self.state
    }

    /// Pick a suggestion: closes the list, rewrites the query as
    /// "name, country" and hands the city back to the caller.
    pub fn select(&mut self, index: usize) -> Option<City> {
        let city = self.suggestions.get(index)?.clone();

        self.cancel_pending();
        self.generation += 1;
        self.awaiting = false;
        self.query = city.display_name();
        self.state = SearchState::Closed;

        tracing::debug!(city = %self.query, "city selected");
        Some(city)
    }

    /// Interaction landed outside the search box: close the list, keep the text.
    pub fn dismiss(&mut self) {
        self.state = SearchState::Closed;
    }

    fn apply(&mut self, batch: SuggestionBatch) -> bool {
        if batch.generation != self.generation {
            tracing::debug!(
                stale = batch.generation,
                current = self.generation,
                "dropping suggestions for superseded query"
            );
            return false;
        }

        self.awaiting = false;
        self.pending = None;

        match batch.cities {
            Some(cities) => {
                self.suggestions = cities;
                self.state = SearchState::SuggestionsOpen;
            }
            None => {
                self.suggestions.clear();
                self.state = SearchState::Closed;
            }
        }

        true
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchInteraction {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
