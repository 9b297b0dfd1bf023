//! Task list screen core
//!
//! This crate joins the live search text and filter preferences into a live
//! task list, queues one-shot UI events, and maps user actions on the list
//! screen onto the task and preference stores.

mod combinator;
mod controller;
mod error;
mod event;

pub use combinator::{QueryCombinator, SnapshotStream, TaskListSnapshot};
pub use controller::ListController;
pub use error::{ListError, Result};
pub use event::{EditResult, EventQueue, EventStream, UiEvent};
