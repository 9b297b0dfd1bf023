//! Core library for the to-do list
//!
//! This crate contains the data model and the persistence collaborators
//! used by the list screen:
//! - Task storage with live, parameterized queries
//! - Filter preferences (sort order, hide completed) as a live value
//! - Environment-driven configuration

pub mod config;
pub mod error;
pub mod preferences;
pub mod task;

pub use config::TodoConfig;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
