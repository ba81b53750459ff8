//! Favorite cities: insertion-ordered, unique ignoring case, unbounded.

use std::sync::Arc;

use crate::error::StateError;
use crate::storage::{load_string_list, save_string_list, KeyValueStore, KEY_FAVORITES};

/// Outcome of [`Favorites::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteToggle {
    pub added: bool,
}

pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    cities: Vec<String>,
}

impl Favorites {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let cities = load_string_list(store.as_ref(), KEY_FAVORITES);
        Self { store, cities }
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.position(city).is_some()
    }

    /// Remove `city` if present (ignoring case), otherwise append it.
    ///
    /// # Errors
    ///
    /// `NoCurrentCity` when `city` is blank.
    pub fn toggle(&mut self, city: &str) -> Result<FavoriteToggle, StateError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(StateError::NoCurrentCity);
        }

        let added = match self.position(city) {
            Some(index) => {
                self.cities.remove(index);
                false
            }
            None => {
                self.cities.push(city.to_string());
                true
            }
        };
        self.persist();
        tracing::debug!("Favorite {} {}", city, if added { "added" } else { "removed" });
        Ok(FavoriteToggle { added })
    }

    /// Remove every entry matching `city` ignoring case. Absent is not an error.
    pub fn remove(&mut self, city: &str) {
        let needle = city.trim().to_lowercase();
        self.cities.retain(|c| c.to_lowercase() != needle);
        self.persist();
    }

    pub fn list(&self) -> &[String] {
        &self.cities
    }

    fn position(&self, city: &str) -> Option<usize> {
        let needle = city.trim().to_lowercase();
        self.cities.iter().position(|c| c.to_lowercase() == needle)
    }

    fn persist(&self) {
        save_string_list(self.store.as_ref(), KEY_FAVORITES, &self.cities);
    }
}
