//! Task model definitions

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preferences::{FilterPreferences, SortOrder};

/// A task in the to-do list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub important: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            important: false,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Copy of this task with a different title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Copy of this task with the importance flag set
    pub fn with_important(mut self, important: bool) -> Self {
        self.important = important;
        self
    }

    /// Copy of this task with the completion flag set
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Copy of this task with a fixed creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Creation date as shown on the edit screen, e.g. `Mar 4, 2026, 09:15`
    pub fn created_at_display(&self) -> String {
        self.created_at.format("%b %-d, %Y, %H:%M").to_string()
    }
}

/// Parameters of a task list query: the live search text joined with the
/// live filter preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub search_term: String,
    pub sort_order: SortOrder,
    pub hide_completed: bool,
}

impl QueryParams {
    pub fn new(search_term: impl Into<String>, preferences: FilterPreferences) -> Self {
        Self {
            search_term: search_term.into(),
            sort_order: preferences.sort_order,
            hide_completed: preferences.hide_completed,
        }
    }

    /// Whether a task belongs in the result of this query
    pub fn matches(&self, task: &Task) -> bool {
        if self.hide_completed && task.completed {
            return false;
        }
        self.search_term.is_empty()
            || task
                .title
                .to_lowercase()
                .contains(&self.search_term.to_lowercase())
    }

    /// Ordering of two matching tasks: important ones first, then by the
    /// selected sort key. Ties fall back to the id so results are stable.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        b.important
            .cmp(&a.important)
            .then_with(|| match self.sort_order {
                SortOrder::ByName => a
                    .title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title)),
                SortOrder::ByDate => a.created_at.cmp(&b.created_at),
            })
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Filter and order a set of tasks
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<Task> {
        let mut result: Vec<Task> = tasks
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        result.sort_by(|a, b| self.compare(a, b));
        result
    }
}
