//! Preference model definitions

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Sort key of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    ByName,
    ByDate,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::ByDate
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by_name" | "name" => Ok(Self::ByName),
            "by_date" | "date" => Ok(Self::ByDate),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

/// Persisted filter preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreferences {
    pub sort_order: SortOrder,
    pub hide_completed: bool,
}
