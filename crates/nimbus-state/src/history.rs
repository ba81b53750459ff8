//! Recent searches, most recent first.

use std::sync::Arc;

use crate::storage::{load_string_list, save_string_list, KeyValueStore, KEY_SEARCH_HISTORY};

pub const MAX_HISTORY: usize = 5;

pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut entries = load_string_list(store.as_ref(), KEY_SEARCH_HISTORY);
        entries.truncate(MAX_HISTORY);
        Self { store, entries }
    }

    /// Move `city` to the front, dropping any case-insensitive duplicate and
    /// anything past the fifth entry. Blank input is ignored.
    pub fn record(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        let needle = city.to_lowercase();
        self.entries.retain(|c| c.to_lowercase() != needle);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(MAX_HISTORY);

        save_string_list(self.store.as_ref(), KEY_SEARCH_HISTORY, &self.entries);
    }

    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
