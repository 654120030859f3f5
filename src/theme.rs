//! Light/dark theme preference.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::db::{Database, DebouncedWriter, PersistenceError, THEME_KEY};

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme: {0} (expected light or dark)")]
pub struct UnknownTheme(pub String);

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Interpret a stored preference: only `"dark"` means dark.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// Process-wide theme with persist-on-change.
#[derive(Debug)]
pub struct ThemeState {
    tx: watch::Sender<Theme>,
    writer: DebouncedWriter,
}

impl ThemeState {
    /// Resolve the starting theme from storage, falling back to the system preference.
    pub async fn init(db: &Database, prefers_dark: bool, debounce: Duration) -> Self {
        let system = Theme::from_system(prefers_dark);
        let theme = match db.get(THEME_KEY).await {
            Ok(Some(saved)) => Theme::from_stored(&saved),
            Ok(None) => system,
            Err(e) => {
                warn!(error = %e, "Could not read theme preference, using system default");
                system
            }
        };

        let writer = DebouncedWriter::spawn(db.clone(), THEME_KEY, debounce);
        writer.schedule(theme.as_str().to_string());

        let (tx, _) = watch::channel(theme);
        Self { tx, writer }
    }

    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Change the theme; persists and notifies subscribers only on an actual change.
    pub fn set(&self, theme: Theme) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == theme {
                return false;
            }
            *current = theme;
            true
        });

        if changed {
            info!(theme = %theme, "Theme changed");
            self.writer.schedule(theme.as_str().to_string());
        }
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    /// Observe theme changes.
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    pub async fn flush(&self) -> Result<(), PersistenceError> {
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(20);

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn test_from_stored() {
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored("purple"), Theme::Light);
        assert!("purple".parse::<Theme>().is_err());
        assert_eq!("DARK".parse::<Theme>(), Ok(Theme::Dark));
    }

    #[tokio::test]
    async fn test_system_default_when_nothing_stored() {
        let db = memory_db().await;
        let theme = ThemeState::init(&db, true, DEBOUNCE).await;
        assert_eq!(theme.current(), Theme::Dark);

        // The resolved default is written back.
        theme.flush().await.unwrap();
        assert_eq!(db.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        let other = ThemeState::init(&memory_db().await, false, DEBOUNCE).await;
        assert_eq!(other.current(), Theme::Light);
    }

    #[tokio::test]
    async fn test_stored_preference_wins() {
        let db = memory_db().await;
        db.set(THEME_KEY, "light").await.unwrap();

        let theme = ThemeState::init(&db, true, DEBOUNCE).await;
        assert_eq!(theme.current(), Theme::Light);
    }

    #[tokio::test]
    async fn test_toggle_persists_and_notifies() {
        let db = memory_db().await;
        let theme = ThemeState::init(&db, false, DEBOUNCE).await;
        let mut rx = theme.subscribe();

        assert_eq!(theme.toggle(), Theme::Dark);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Theme::Dark);

        theme.flush().await.unwrap();
        assert_eq!(db.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));

        let reopened = ThemeState::init(&db, false, DEBOUNCE).await;
        assert_eq!(reopened.current(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_setting_same_theme_is_silent() {
        let db = memory_db().await;
        let theme = ThemeState::init(&db, false, DEBOUNCE).await;
        let rx = theme.subscribe();

        theme.set(Theme::Light);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_storage_uses_system_default() {
        let db = memory_db().await;
        db.close().await;

        let theme = ThemeState::init(&db, true, DEBOUNCE).await;
        assert_eq!(theme.current(), Theme::Dark);
        theme.toggle();
        assert_eq!(theme.current(), Theme::Light);
    }
}
