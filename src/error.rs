// Typed errors for the task store

use std::path::PathBuf;
use thiserror::Error;

use crate::models::TaskId;

/// Problem reading the persisted document. Never fatal: the store keeps this
/// around as a warning. `Io` and `Malformed` leave the store empty;
/// `InvalidRecords` keeps every entry that could be read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed task file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("dropped entries at positions {positions:?} of {path}: not task objects")]
    InvalidRecords { path: PathBuf, positions: Vec<usize> },
}

/// Failure to persist the in-memory sequence.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected input. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task text cannot be empty or whitespace-only")]
    BlankText,

    #[error("index {index} out of range (have {len} tasks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no task with id {0}")]
    UnknownId(TaskId),
}

/// Result error of every mutating store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The change was applied in memory but could not be written.
    #[error(transparent)]
    Save(#[from] SaveError),
}

impl StoreError {
    /// True when the in-memory state changed even though the call failed
    pub fn is_applied(&self) -> bool {
        matches!(self, StoreError::Save(_))
    }
}
