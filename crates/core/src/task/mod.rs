//! Task module
//!
//! This module contains task-related types and storage.

mod file_store;
mod model;
mod repository;

pub use file_store::FileTaskStore;
pub use model::*;
pub use repository::{TaskStore, TaskStream};
