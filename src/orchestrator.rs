//! Injectable weather state: city store, per-city snapshot cache and load
//! status, plus the fetches that keep them current.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::client::OpenMeteoClient;
use crate::constants::LOAD_ERROR_MESSAGE;
use crate::error::WeatherError;
use crate::models::SavedCity;
use crate::snapshot::WeatherSnapshot;
use crate::store::CityStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Issued when a fetch starts; only the newest ticket for a city may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct FetchTicket(u64);

pub struct WeatherState {
    client: OpenMeteoClient,
    store: RwLock<CityStore>,
    cache: RwLock<HashMap<String, Arc<WeatherSnapshot>>>,
    tickets: Mutex<HashMap<String, u64>>,
    status: watch::Sender<LoadStatus>,
    in_flight: AtomicUsize,
}

/// Holds the loading flag up for one explicit load; clears it when the last
/// outstanding load is dropped, whichever way it exits.
///
/// The in-flight count only changes inside `send_modify`, so the count and
/// the flag move together under the channel's lock.
struct LoadingGuard<'a> {
    state: &'a WeatherState,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a WeatherState) -> Self {
        state.status.send_modify(|s| {
            state.in_flight.fetch_add(1, Ordering::SeqCst);
            s.loading = true;
            s.error = None;
        });
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.state.in_flight;
        self.state.status.send_modify(|s| {
            if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                s.loading = false;
            }
        });
    }
}

impl WeatherState {
    pub fn new(client: OpenMeteoClient, store: CityStore) -> Self {
        let (status, _) = watch::channel(LoadStatus::default());
        Self {
            client,
            store: RwLock::new(store),
            cache: RwLock::new(HashMap::new()),
            tickets: Mutex::new(HashMap::new()),
            status,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn client(&self) -> &OpenMeteoClient {
        &self.client
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    pub async fn cities(&self) -> Vec<SavedCity> {
        self.store.read().await.cities().to_vec()
    }

    pub async fn active_city(&self) -> Option<SavedCity> {
        self.store.read().await.active().cloned()
    }

    pub async fn saved_city(&self, name: &str) -> Option<SavedCity> {
        self.store.read().await.get(name).cloned()
    }

    pub async fn snapshot(&self, name: &str) -> Option<Arc<WeatherSnapshot>> {
        self.cache.read().await.get(name).cloned()
    }

    pub async fn snapshots(&self) -> HashMap<String, Arc<WeatherSnapshot>> {
        self.cache.read().await.clone()
    }

    pub async fn active_snapshot(&self) -> Option<Arc<WeatherSnapshot>> {
        let active = self.active_city().await?;
        self.snapshot(&active.name).await
    }

    pub fn status(&self) -> LoadStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LoadStatus> {
        self.status.subscribe()
    }

    pub async fn subscribe_cities(&self) -> watch::Receiver<Vec<SavedCity>> {
        self.store.read().await.subscribe()
    }

    // ------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------

    /// Saves `city`. Its weather arrives through the background fill.
    pub async fn add_city(&self, city: SavedCity) -> bool {
        self.store.write().await.add_city(city)
    }

    /// Removes `name`; when that moves the active city, loads the new one.
    pub async fn remove_city(&self, name: &str) -> bool {
        let (removed, new_active) = {
            let mut store = self.store.write().await;
            let was_active = store.active().is_some_and(|a| a.name == name);
            let removed = store.remove_city(name);
            let new_active = if removed && was_active {
                store.active().cloned()
            } else {
                None
            };
            (removed, new_active)
        };

        if let Some(city) = new_active {
            // Failure is already recorded in the status
            let _ = self.load_weather_for_city(&city).await;
        }
        removed
    }

    /// Makes `city` active and loads its weather.
    pub async fn set_active_city(
        &self,
        city: SavedCity,
    ) -> Result<Arc<WeatherSnapshot>, WeatherError> {
        self.store.write().await.set_active_city(city.clone());
        self.load_weather_for_city(&city).await
    }

    /// Reloads the active city, if there is one.
    pub async fn refresh_weather(&self) -> Option<Result<Arc<WeatherSnapshot>, WeatherError>> {
        let active = self.active_city().await?;
        Some(self.load_weather_for_city(&active).await)
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Fetches `city` and caches the result under its name.
    ///
    /// Always hits the network. On failure the status carries a generic
    /// error and any earlier snapshot for the city stays in the cache.
    pub async fn load_weather_for_city(
        &self,
        city: &SavedCity,
    ) -> Result<Arc<WeatherSnapshot>, WeatherError> {
        let _loading = LoadingGuard::start(self);
        let ticket = self.issue_ticket(&city.name);

        match self.client.fetch_weather(city).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.apply(ticket, snapshot.clone()).await;
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Failed to load weather for {}: {}", city.name, e);
                self.status
                    .send_modify(|s| s.error = Some(LOAD_ERROR_MESSAGE.to_string()));
                Err(e)
            }
        }
    }

    /// Fetches every saved city without a snapshot, one at a time in list
    /// order. Failures are logged and skipped. Returns how many were cached.
    pub async fn background_fill(&self) -> usize {
        let cities = self.cities().await;
        let mut filled = 0;

        for city in cities {
            if self.cache.read().await.contains_key(&city.name) {
                continue;
            }

            let ticket = self.issue_ticket(&city.name);
            match self.client.fetch_weather(&city).await {
                Ok(snapshot) => {
                    if self.apply(ticket, Arc::new(snapshot)).await {
                        filled += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!("Background fetch for {} failed: {}", city.name, e);
                }
            }
        }

        filled
    }

    /// Spawns the session task: loads the active city, then fills missing
    /// snapshots now and whenever the saved list changes. The task ends once
    /// the state is dropped.
    pub async fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.subscribe_cities().await;
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            if let Some(state) = weak.upgrade() {
                if let Some(active) = state.active_city().await {
                    let _ = state.load_weather_for_city(&active).await;
                }
            }

            loop {
                let Some(state) = weak.upgrade() else { break };
                let filled = state.background_fill().await;
                if filled > 0 {
                    tracing::debug!("Background fill cached {} cities", filled);
                }
                drop(state);

                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    pub(crate) fn issue_ticket(&self, name: &str) -> FetchTicket {
        let mut tickets = self.tickets.lock();
        let seq = tickets.entry(name.to_string()).or_insert(0);
        *seq += 1;
        FetchTicket(*seq)
    }

    /// Stores `snapshot` unless a newer fetch for the same city has been
    /// issued since `ticket`. A superseded result still fills a city that has
    /// nothing cached, so a newer fetch that fails does not leave it empty;
    /// if that newer fetch succeeds it overwrites the entry.
    pub(crate) async fn apply(&self, ticket: FetchTicket, snapshot: Arc<WeatherSnapshot>) -> bool {
        let name = snapshot.location.name.clone();
        let mut cache = self.cache.write().await;

        let latest = self.tickets.lock().get(&name).copied().unwrap_or(0);
        if ticket.0 != latest && cache.contains_key(&name) {
            tracing::debug!(
                "Discarding superseded weather for {} (fetch {} of {})",
                name,
                ticket.0,
                latest
            );
            return false;
        }

        cache.insert(name, snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::snapshot::CurrentConditions;
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    fn state() -> WeatherState {
        let client = OpenMeteoClient::new(&ApiConfig::default()).unwrap();
        WeatherState::new(client, CityStore::load(Arc::new(MemoryStorage::new())))
    }

    fn snapshot(name: &str, temperature: i32) -> Arc<WeatherSnapshot> {
        Arc::new(WeatherSnapshot {
            current: CurrentConditions {
                temperature,
                feels_like: temperature,
                humidity: 50,
                wind_speed: 10,
                wind_direction: 180,
                weather_code: 0,
                uv_index: 1,
                is_day: true,
            },
            hourly: Vec::new(),
            daily: Vec::new(),
            location: SavedCity::new(name, "Somewhere", 0.0, 0.0),
            timezone: "GMT".to_string(),
            fetched_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn later_ticket_wins_regardless_of_completion_order() {
        let state = state();
        let background = state.issue_ticket("London");
        let user = state.issue_ticket("London");

        assert!(state.apply(user, snapshot("London", 20)).await);
        assert!(!state.apply(background, snapshot("London", 5)).await);

        let cached = state.snapshot("London").await.unwrap();
        assert_eq!(cached.current.temperature, 20);
    }

    #[tokio::test]
    async fn superseded_result_fills_empty_entry() {
        let state = state();
        let background = state.issue_ticket("London");
        // Newer explicit load takes a ticket, then fails without applying
        let _failed = state.issue_ticket("London");

        assert!(state.apply(background, snapshot("London", 7)).await);
        let cached = state.snapshot("London").await.unwrap();
        assert_eq!(cached.current.temperature, 7);
    }

    #[tokio::test]
    async fn newest_result_overwrites_superseded_fill() {
        let state = state();
        let background = state.issue_ticket("London");
        let user = state.issue_ticket("London");

        assert!(state.apply(background, snapshot("London", 7)).await);
        assert!(state.apply(user, snapshot("London", 20)).await);

        let cached = state.snapshot("London").await.unwrap();
        assert_eq!(cached.current.temperature, 20);
    }

    #[tokio::test]
    async fn tickets_are_per_city() {
        let state = state();
        let london = state.issue_ticket("London");
        let _paris = state.issue_ticket("Paris");

        assert!(state.apply(london, snapshot("London", 12)).await);
    }

    #[tokio::test]
    async fn loading_guard_clears_after_last_load() {
        let state = state();
        {
            let _first = LoadingGuard::start(&state);
            {
                let _second = LoadingGuard::start(&state);
                assert!(state.status().loading);
            }
            assert!(state.status().loading);
        }
        assert!(!state.status().loading);
    }

    #[test]
    fn overlapping_guards_on_threads_keep_flag_up() {
        let state = Arc::new(state());
        let threads: Vec<_> = (0..2)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..5_000 {
                        let _guard = LoadingGuard::start(&state);
                        assert!(state.status().loading);
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }
        assert!(!state.status().loading);
        assert_eq!(state.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn loading_guard_clears_previous_error() {
        let state = state();
        state
            .status
            .send_modify(|s| s.error = Some(LOAD_ERROR_MESSAGE.to_string()));

        let _guard = LoadingGuard::start(&state);
        assert_eq!(state.status().error, None);
    }

    #[tokio::test]
    async fn active_snapshot_follows_active_city() {
        let state = state();
        let ticket = state.issue_ticket("New York");
        state.apply(ticket, snapshot("New York", 18)).await;

        let active = state.active_snapshot().await.unwrap();
        assert_eq!(active.location.name, "New York");
    }
}
