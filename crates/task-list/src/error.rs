//! Error types for task-list

use thiserror::Error;

/// Result type alias for list screen operations
pub type Result<T> = std::result::Result<T, ListError>;

/// Errors surfaced to the caller of a list screen operation
#[derive(Debug, Error)]
pub enum ListError {
    /// Task or preference persistence failed
    #[error(transparent)]
    Store(#[from] todo_core::Error),

    /// The event consumer was dropped before the event could be queued
    #[error("Event consumer closed")]
    EventConsumerClosed,
}
