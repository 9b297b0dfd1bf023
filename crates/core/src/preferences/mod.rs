//! Filter preferences
//!
//! The sort order and "hide completed" switch shared by every list screen.

mod model;
mod store;

pub use model::*;
pub use store::*;
