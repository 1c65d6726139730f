//! Debounced city search session, driven by query changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::client::OpenMeteoClient;
use crate::constants::MIN_QUERY_CHARS;
use crate::debounce::Debouncer;
use crate::models::GeocodingResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<GeocodingResult>,
    /// True from the moment a lookup is scheduled until its results land
    pub searching: bool,
}

/// Coalesces query changes and publishes results through a `watch` channel.
pub struct CitySearch {
    client: OpenMeteoClient,
    debouncer: Debouncer,
    state: Arc<watch::Sender<SearchState>>,
}

impl CitySearch {
    pub fn new(client: OpenMeteoClient, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            client,
            debouncer: Debouncer::new(debounce),
            state: Arc::new(state),
        }
    }

    /// Quiet period a query must survive before it is looked up.
    pub fn debounce(&self) -> Duration {
        self.debouncer.delay()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Records a new query. Short queries clear the results immediately;
    /// longer ones are looked up once the input has been quiet for the
    /// debounce period.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.debouncer.cancel();

        if query.chars().count() < MIN_QUERY_CHARS {
            self.state.send_replace(SearchState {
                query,
                results: Vec::new(),
                searching: false,
            });
            return;
        }

        self.state.send_modify(|s| {
            s.query = query.clone();
            s.searching = true;
        });

        let client = self.client.clone();
        let state = Arc::clone(&self.state);
        self.debouncer.schedule(async move {
            let results = client.search_cities(&query).await;
            // Results for a query the user has already moved past are dropped
            state.send_if_modified(|s| {
                if s.query != query {
                    tracing::debug!("Dropping stale results for {:?}", query);
                    return false;
                }
                s.results = results;
                s.searching = false;
                true
            });
        });
    }

    /// Stops any pending lookup, e.g. when the search input is closed.
    pub fn cancel(&self) {
        if self.debouncer.cancel() {
            self.state.send_modify(|s| s.searching = false);
        }
    }

    /// Clears the query and results.
    pub fn clear(&self) {
        self.debouncer.cancel();
        self.state.send_replace(SearchState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn debounce_reaches_the_debouncer() {
        let client = OpenMeteoClient::new(&ApiConfig::default()).unwrap();
        let search = CitySearch::new(client, Duration::from_millis(750));
        assert_eq!(search.debounce(), Duration::from_millis(750));
    }
}
