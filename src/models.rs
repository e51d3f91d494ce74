// Data models for the to-do store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type used for every task field
pub type Timestamp = DateTime<Utc>;

/// Helper function to get the current timestamp
pub fn now() -> Timestamp {
    Utc::now()
}

/// Stable opaque identifier, assigned once when a task is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}' (expected low, normal or high)", other)),
        }
    }
}

/// A single work item
///
/// Serialized with the key names of the on-disk document (`task`, `created`,
/// `completed`, `edited`). Reading goes through [`crate::json`], which
/// tolerates missing and unknown keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "task")]
    pub text: String,
    pub done: bool,
    pub priority: Priority,
    #[serde(rename = "created")]
    pub created_at: Timestamp,
    #[serde(rename = "completed", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(rename = "edited", skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<Timestamp>,
}

impl Task {
    /// Create an open task. `text` must already be trimmed and non-empty.
    pub fn new(text: impl Into<String>, priority: Priority, created_at: Timestamp) -> Self {
        Self {
            id: TaskId::new(),
            text: text.into(),
            done: false,
            priority,
            created_at,
            completed_at: None,
            edited_at: None,
        }
    }

    /// Flip `done`, keeping `completed_at` present iff the task is done
    pub(crate) fn toggle(&mut self, at: Timestamp) {
        if self.done {
            self.done = false;
            self.completed_at = None;
        } else {
            self.mark_done(at);
        }
    }

    pub(crate) fn mark_done(&mut self, at: Timestamp) {
        self.done = true;
        self.completed_at = Some(at);
    }

    pub(crate) fn set_text(&mut self, text: String, at: Timestamp) {
        self.text = text;
        self.edited_at = Some(at);
    }

    /// Case-insensitive substring match. `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty() || self.text.to_lowercase().contains(needle)
    }
}

/// Trim `text` and reject it if nothing is left
pub(crate) fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
