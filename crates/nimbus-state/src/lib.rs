//! Dashboard state: persisted preferences, favorites and search history,
//! plus the transient weather session.

pub mod error;
pub mod favorites;
pub mod history;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod theme;

pub use error::StateError;
pub use favorites::{FavoriteToggle, Favorites};
pub use history::SearchHistory;
pub use preferences::{PreferenceEvent, PreferenceStore};
pub use session::WeatherSession;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use theme::{resolve_theme, ColorScheme, ColorSchemeSource, TerminalColorScheme, ThemeMode};
