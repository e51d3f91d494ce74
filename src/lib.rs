// todostore - Single-file JSON to-do store

pub mod config;
pub mod error;
pub mod filter;
pub mod json;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use error::{LoadError, SaveError, StoreError, ValidationError};
pub use filter::{Matches, StatusFilter};
pub use models::{Priority, Task, TaskId, Timestamp, now};
pub use store::{Change, Stats, TaskStore};
