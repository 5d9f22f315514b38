//! Light/dark theme preference, persisted under a single `theme` key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    theme: Theme,
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes the theme in `preferences.json` inside the config directory
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    current: Theme,
}

impl ThemeStore {
    /// Open the store and read the saved theme.
    ///
    /// A missing or unreadable file yields the light theme.
    pub fn open(config_dir: &Path) -> Self {
        let path = config_dir.join(PREFERENCES_FILE);
        let current = Self::read(&path);
        Self { path, current }
    }

    fn read(path: &Path) -> Theme {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Theme::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return Theme::default();
            }
        };

        match serde_json::from_str::<Preferences>(&contents) {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                tracing::warn!("Ignoring malformed preferences {}: {}", path.display(), e);
                Theme::default()
            }
        }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Persist `theme` and make it current
    pub fn set(&mut self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&Preferences { theme })?;
        std::fs::write(&self.path, contents)?;

        self.current = theme;
        tracing::debug!("Theme set to {}", theme.as_str());
        Ok(())
    }

    /// Switch between light and dark, persisting the result
    pub fn toggle(&mut self) -> Result<Theme, ThemeError> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::open(dir.path());
        assert_eq!(store.current(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = ThemeStore::open(dir.path());
        assert_eq!(store.toggle().unwrap(), Theme::Dark);

        let reopened = ThemeStore::open(dir.path());
        assert_eq!(reopened.current(), Theme::Dark);

        let contents = std::fs::read_to_string(dir.path().join(PREFERENCES_FILE)).unwrap();
        assert!(contents.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_toggle_twice_returns_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ThemeStore::open(dir.path());
        store.toggle().unwrap();
        assert_eq!(store.toggle().unwrap(), Theme::Light);
        assert_eq!(ThemeStore::open(dir.path()).current(), Theme::Light);
    }

    #[test]
    fn test_malformed_file_falls_back_to_light() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), "{not json").unwrap();
        assert_eq!(ThemeStore::open(dir.path()).current(), Theme::Light);
    }

    #[test]
    fn test_creates_missing_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = ThemeStore::open(&nested);
        store.set(Theme::Dark).unwrap();
        assert_eq!(ThemeStore::open(&nested).current(), Theme::Dark);
    }
}
