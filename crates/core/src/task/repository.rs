//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use super::model::{QueryParams, Task};
use crate::Result;

/// A live query result: yields the current matching tasks first, then a
/// fresh result after every change to the underlying data.
pub type TaskStream = BoxStream<'static, Result<Vec<Task>>>;

/// Repository interface for task storage
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Open a live query for the given parameters
    ///
    /// Switching between queries when the parameters change is the
    /// caller's job; the store only keeps each stream up to date.
    async fn query(&self, params: QueryParams) -> Result<TaskStream>;

    /// Insert a task, overwriting any task with the same ID
    async fn insert(&self, task: Task) -> Result<()>;

    /// Update an existing task
    async fn update(&self, task: Task) -> Result<()>;

    /// Delete a task, returning whether it was present
    async fn delete(&self, task: &Task) -> Result<bool>;

    /// Get a task by ID
    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    /// Get all tasks, oldest first
    async fn list(&self) -> Result<Vec<Task>>;
}
