//! Environment-driven configuration

use std::path::PathBuf;

use tracing::warn;

use crate::preferences::{FilterPreferences, SortOrder};

const DEFAULT_DATA_DIR: &str = ".todo-data";

/// Where the stores live and which preferences a fresh install starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub data_dir: PathBuf,
    pub default_preferences: FilterPreferences,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_preferences: FilterPreferences::default(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl TodoConfig {
    /// Resolve the configuration from `TODO_DATA_DIR`, `TODO_SORT_ORDER` and
    /// `TODO_HIDE_COMPLETED`. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("TODO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let sort_order = match lookup("TODO_SORT_ORDER") {
            Some(raw) => raw.parse::<SortOrder>().unwrap_or_else(|e| {
                warn!("Ignoring TODO_SORT_ORDER: {}", e);
                defaults.default_preferences.sort_order
            }),
            None => defaults.default_preferences.sort_order,
        };

        let hide_completed = lookup("TODO_HIDE_COMPLETED")
            .and_then(|raw| parse_flag(&raw))
            .unwrap_or(defaults.default_preferences.hide_completed);

        Self {
            data_dir,
            default_preferences: FilterPreferences {
                sort_order,
                hide_completed,
            },
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}
