//! Light/dark presentation theme, persisted in client storage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::storage::{ClientStorage, THEME_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Class applied to the root of the rendered document.
    pub fn root_class(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_class())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme '{}', expected light or dark", other)),
        }
    }
}

pub struct ThemeStore {
    storage: Arc<dyn ClientStorage>,
    theme: watch::Sender<Theme>,
}

impl ThemeStore {
    /// Restores the persisted theme, falling back to `default`.
    pub fn new(storage: Arc<dyn ClientStorage>, default: Theme) -> Self {
        let initial = storage
            .get(THEME_KEY)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default);
        let (theme, _) = watch::channel(initial);
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn root_class(&self) -> &'static str {
        self.theme().root_class()
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    pub fn toggle(&self) -> Theme {
        self.set(self.theme().toggled())
    }

    pub fn set(&self, theme: Theme) -> Theme {
        if let Err(err) = self.storage.set(THEME_KEY, theme.root_class()) {
            warn!("Could not persist theme: {}", err);
        }
        self.theme.send_replace(theme);
        theme
    }
}
