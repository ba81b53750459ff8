//! Durable key-value storage behind a small port.
//!
//! Values are plain strings; callers decide the encoding. Writes are atomic
//! per key and there are no transactions across keys.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

use crate::error::StateError;

pub const KEY_TEMPERATURE_UNIT: &str = "temperatureUnit";
pub const KEY_THEME: &str = "theme";
pub const KEY_FAVORITES: &str = "favoriteCities";
pub const KEY_SEARCH_HISTORY: &str = "searchHistory";
pub const KEY_HAS_SEARCHED: &str = "hasSearched";

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StateError>;
}

/// SQLite-backed store, one row per key.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StateError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, gone when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn in_memory() -> Result<Self, StateError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StateError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(map),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a JSON-encoded list, falling back to empty when absent or malformed.
pub(crate) fn load_string_list(store: &dyn KeyValueStore, key: &str) -> Vec<String> {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => list,
            Err(e) => {
                let err = StateError::MalformedStoredPreference {
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}; using an empty list", err);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            Vec::new()
        }
    }
}

/// Persist a list as JSON. Failures are logged and swallowed.
pub(crate) fn save_string_list(store: &dyn KeyValueStore, key: &str, list: &[String]) {
    let result = serde_json::to_string(list)
        .map_err(|e| StateError::Storage(e.to_string()))
        .and_then(|raw| store.set(key, &raw));
    if let Err(e) = result {
        tracing::warn!("Failed to persist {}: {}", key, e);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Store whose writes always fail, reads see nothing.
    pub(crate) struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StateError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StateError> {
            Err(StateError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_sqlite_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get(KEY_THEME).unwrap(), None);
        store.set(KEY_THEME, "dark").unwrap();
        store.set(KEY_THEME, "light").unwrap();
        assert_eq!(store.get(KEY_THEME).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set(KEY_FAVORITES, r#"["Paris"]"#).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get(KEY_FAVORITES).unwrap().as_deref(),
            Some(r#"["Paris"]"#)
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_values([(KEY_HAS_SEARCHED, "true")]);
        assert_eq!(store.get(KEY_HAS_SEARCHED).unwrap().as_deref(), Some("true"));
        store.set(KEY_HAS_SEARCHED, "false").unwrap();
        assert_eq!(store.get(KEY_HAS_SEARCHED).unwrap().as_deref(), Some("false"));
        assert_eq!(store.get(KEY_THEME).unwrap(), None);
    }

    #[test]
    fn test_malformed_list_falls_back_to_empty() {
        let store = MemoryStore::with_values([(KEY_SEARCH_HISTORY, "not json")]);
        assert!(load_string_list(&store, KEY_SEARCH_HISTORY).is_empty());

        let store = MemoryStore::with_values([(KEY_SEARCH_HISTORY, r#"{"a":1}"#)]);
        assert!(load_string_list(&store, KEY_SEARCH_HISTORY).is_empty());
    }

    #[test]
    fn test_list_round_trip() {
        let store = MemoryStore::new();
        let list = vec!["Lima".to_string(), "Quito".to_string()];
        save_string_list(&store, KEY_FAVORITES, &list);
        assert_eq!(load_string_list(&store, KEY_FAVORITES), list);
    }
}
