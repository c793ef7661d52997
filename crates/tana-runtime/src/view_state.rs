//! Persist and restore the library view's controls across sessions.
//!
//! Saves a small JSON map to `~/.local/share/tana/view.json`
//! (or platform equivalent via `directories` crate).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tana_core::projection::{SortDirection, SortField, StatusFilter};

const FILE_NAME: &str = "view.json";

pub const KEY_SEARCH: &str = "view.search";
pub const KEY_SORT_FIELD: &str = "view.sort_field";
pub const KEY_SORT_DIRECTION: &str = "view.sort_direction";
pub const KEY_STATUS_TAB: &str = "view.status_tab";

/// String key-value storage the view state writes through to.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }
}

/// JSON-file-backed store under the platform data dir.
#[derive(Debug)]
pub struct FileStore {
    path: Option<PathBuf>,
    map: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the default store, starting empty when the file is missing
    /// or unreadable.
    pub fn open() -> Self {
        Self::from_path(state_path())
    }

    /// Open a store backed by an explicit file.
    pub fn open_at(path: &Path) -> Self {
        Self::from_path(Some(path.to_path_buf()))
    }

    fn from_path(path: Option<PathBuf>) -> Self {
        let map = path
            .as_deref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path,
            map: Mutex::new(map),
        }
    }

    /// Write the whole map back. Errors are logged but not propagated.
    fn save(&self, map: &HashMap<String, String>) {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(map) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(path, json) {
                        tracing::warn!("Failed to save view state: {e}");
                    }
                }
                Err(e) => tracing::warn!("Failed to serialize view state: {e}"),
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
            self.save(&map);
        }
    }
}

/// The library view's controls. Loaded once at startup; every setter
/// writes through to the store, so closing at any point loses nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub status_tab: StatusFilter,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_field: SortField::Id,
            sort_direction: SortDirection::Ascending,
            status_tab: StatusFilter::All,
        }
    }
}

impl ViewState {
    /// Load from a store. Each field falls back to its default when the
    /// stored value is missing or no longer parses.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            search: store.get(KEY_SEARCH).unwrap_or(defaults.search),
            sort_field: store
                .get(KEY_SORT_FIELD)
                .and_then(|v| SortField::from_str(&v))
                .unwrap_or(defaults.sort_field),
            sort_direction: store
                .get(KEY_SORT_DIRECTION)
                .and_then(|v| SortDirection::from_str(&v))
                .unwrap_or(defaults.sort_direction),
            status_tab: store
                .get(KEY_STATUS_TAB)
                .and_then(|v| StatusFilter::from_str(&v))
                .unwrap_or(defaults.status_tab),
        }
    }

    pub fn set_search(&mut self, store: &dyn KeyValueStore, search: &str) {
        self.search = search.to_string();
        store.set(KEY_SEARCH, search);
    }

    pub fn set_sort_field(&mut self, store: &dyn KeyValueStore, field: SortField) {
        self.sort_field = field;
        store.set(KEY_SORT_FIELD, field.as_str());
    }

    pub fn set_sort_direction(&mut self, store: &dyn KeyValueStore, direction: SortDirection) {
        self.sort_direction = direction;
        store.set(KEY_SORT_DIRECTION, direction.as_str());
    }

    pub fn set_status_tab(&mut self, store: &dyn KeyValueStore, tab: StatusFilter) {
        self.status_tab = tab;
        store.set(KEY_STATUS_TAB, tab.as_str());
    }
}

/// Path to the view state JSON file.
fn state_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tana").map(|dirs| dirs.data_dir().join(FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tana_core::models::WatchStatus;

    #[test]
    fn test_defaults_when_store_empty() {
        let store = MemoryStore::default();
        let state = ViewState::load(&store);
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn test_setters_write_through() {
        let store = MemoryStore::default();
        let mut state = ViewState::load(&store);

        state.set_search(&store, "note");
        state.set_sort_field(&store, SortField::Score);
        state.set_sort_direction(&store, SortDirection::Descending);
        state.set_status_tab(&store, StatusFilter::Status(WatchStatus::Current));

        let reloaded = ViewState::load(&store);
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.search, "note");
        assert_eq!(reloaded.sort_field, SortField::Score);
        assert_eq!(reloaded.sort_direction, SortDirection::Descending);
        assert_eq!(
            reloaded.status_tab,
            StatusFilter::Status(WatchStatus::Current)
        );
    }

    #[test]
    fn test_unparseable_values_fall_back_per_field() {
        let store = MemoryStore::default();
        store.set(KEY_SEARCH, "mushi");
        store.set(KEY_SORT_FIELD, "no_such_field");
        store.set(KEY_STATUS_TAB, "BINGEING");

        let state = ViewState::load(&store);
        assert_eq!(state.search, "mushi");
        assert_eq!(state.sort_field, SortField::Id);
        assert_eq!(state.status_tab, StatusFilter::All);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");

        {
            let store = FileStore::open_at(&path);
            let mut state = ViewState::load(&store);
            state.set_search(&store, "frieren");
            state.set_sort_direction(&store, SortDirection::Descending);
        }

        let store = FileStore::open_at(&path);
        let state = ViewState::load(&store);
        assert_eq!(state.search, "frieren");
        assert_eq!(state.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open_at(&path);
        assert_eq!(ViewState::load(&store), ViewState::default());

        // Writing through repairs the file.
        store.set(KEY_SEARCH, "akira");
        let reopened = FileStore::open_at(&path);
        assert_eq!(reopened.get(KEY_SEARCH).as_deref(), Some("akira"));
    }
}
