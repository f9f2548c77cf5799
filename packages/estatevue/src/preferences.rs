//! Persisted UI preferences (dark mode).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::PreferenceError;

pub const DARK_MODE_KEY: &str = "darkMode";

/// String key-value store for preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object in one file.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        debug!(path = %self.path.display(), key, "preference saved");
        Ok(())
    }
}

/// Light/dark theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreference {
    pub dark_mode: bool,
}

impl ThemePreference {
    /// Saved choice if any, else the system preference.
    pub fn load(
        store: &dyn PreferenceStore,
        system_prefers_dark: bool,
    ) -> Result<Self, PreferenceError> {
        let dark_mode = match store.get(DARK_MODE_KEY)? {
            Some(saved) => saved == "true",
            None => system_prefers_dark,
        };
        Ok(Self { dark_mode })
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        store.set(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })
    }

    /// Flip the theme and persist the new choice.
    pub fn toggle(&mut self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        self.dark_mode = !self.dark_mode;
        self.save(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_system_preference() {
        let store = MemoryPreferenceStore::new();
        assert!(ThemePreference::load(&store, true).unwrap().dark_mode);
        assert!(!ThemePreference::load(&store, false).unwrap().dark_mode);
    }

    #[test]
    fn saved_value_wins_over_system() {
        let store = MemoryPreferenceStore::new();
        store.set(DARK_MODE_KEY, "false").unwrap();
        assert!(!ThemePreference::load(&store, true).unwrap().dark_mode);
    }

    #[test]
    fn toggle_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePreferenceStore::new(dir.path().join("nested/prefs.json"));

        let mut theme = ThemePreference::load(&store, false).unwrap();
        theme.toggle(&store).unwrap();

        let reloaded = ThemePreference::load(&JsonFilePreferenceStore::new(store.path()), false).unwrap();
        assert!(reloaded.dark_mode);
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFilePreferenceStore::new(&path).get(DARK_MODE_KEY).unwrap_err();
        assert!(matches!(err, PreferenceError::Serialization(_)));
    }
}
