//! Saved cities and the active city, persisted through [`KeyValueStorage`].

use std::sync::Arc;

use tokio::sync::watch;

use crate::constants::STORAGE_KEY;
use crate::error::WeatherError;
use crate::models::SavedCity;
use crate::storage::KeyValueStorage;

/// Cities shown on first launch or when the persisted list is unusable
pub fn default_cities() -> Vec<SavedCity> {
    vec![
        SavedCity::new("New York", "United States", 40.7128, -74.006),
        SavedCity::new("London", "United Kingdom", 51.5074, -0.1278),
        SavedCity::new("Tokyo", "Japan", 35.6762, 139.6503),
        SavedCity::new("Paris", "France", 48.8566, 2.3522),
        SavedCity::new("Sydney", "Australia", -33.8688, 151.2093),
        SavedCity::new("Dubai", "UAE", 25.2048, 55.2708),
    ]
}

/// Ordered list of saved cities plus the active one.
///
/// Every list mutation is written through to storage before returning and
/// published to subscribers.
pub struct CityStore {
    cities: Vec<SavedCity>,
    active: Option<SavedCity>,
    storage: Arc<dyn KeyValueStorage>,
    changes: watch::Sender<Vec<SavedCity>>,
}

impl CityStore {
    /// Loads the persisted list, falling back to [`default_cities`] when the
    /// stored value is absent, malformed or empty. The fallback list is
    /// written back so storage always holds a readable list.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let persisted = Self::read_persisted(storage.as_ref());
        let fell_back = persisted.is_none();
        let cities = persisted.unwrap_or_else(default_cities);
        let active = cities.first().cloned();
        let (changes, _) = watch::channel(cities.clone());

        let store = Self {
            cities,
            active,
            storage,
            changes,
        };
        if fell_back {
            store.persist();
        }
        store
    }

    fn read_persisted(storage: &dyn KeyValueStorage) -> Option<Vec<SavedCity>> {
        let raw = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read saved cities: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<SavedCity>>(&raw) {
            Ok(cities) if !cities.is_empty() => Some(cities),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Ignoring unreadable saved cities: {}", e);
                None
            }
        }
    }

    pub fn cities(&self) -> &[SavedCity] {
        &self.cities
    }

    pub fn active(&self) -> Option<&SavedCity> {
        self.active.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&SavedCity> {
        self.cities.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Receives the full list after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<SavedCity>> {
        self.changes.subscribe()
    }

    /// Appends `city` unless one with the same name is already saved.
    pub fn add_city(&mut self, city: SavedCity) -> bool {
        if self.contains(&city.name) {
            return false;
        }
        tracing::info!("Saving city: {}", city.name);
        self.cities.push(city);
        self.list_changed();
        true
    }

    /// Removes the named city. If it was active, the first remaining city
    /// becomes active, or none when the list is now empty.
    pub fn remove_city(&mut self, name: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c.name != name);
        if self.cities.len() == before {
            return false;
        }
        tracing::info!("Removed city: {}", name);

        if self.active.as_ref().is_some_and(|a| a.name == name) {
            self.active = self.cities.first().cloned();
        }
        self.list_changed();
        true
    }

    /// Replaces the active city. Membership in the saved list is not checked.
    pub fn set_active_city(&mut self, city: SavedCity) {
        self.active = Some(city);
    }

    fn list_changed(&mut self) {
        self.persist();
        self.changes.send_replace(self.cities.clone());
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.cities)
            .map_err(WeatherError::from)
            .and_then(|json| self.storage.set(STORAGE_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("Failed to persist saved cities: {}", e);
        }
    }
}
