// JSON document operations

use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{LoadError, SaveError};
use crate::models::{Priority, Task, TaskId, Timestamp, now};

/// Text given to a stored entry whose `task` is missing or blank
pub const PLACEHOLDER_TEXT: &str = "Unknown task";

/// Tasks read from disk, plus a warning when some entries were unusable
#[derive(Debug, Default)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    pub warning: Option<LoadError>,
}

/// Read every task from the JSON document at `path`
///
/// A missing file yields an empty list. The top level must be an array;
/// anything else is an error. Objects are decoded leniently and kept even
/// without usable task text (under [`PLACEHOLDER_TEXT`]). Elements that are
/// not objects are dropped and reported through [`Loaded::warning`].
pub fn read_tasks(path: &Path) -> Result<Loaded, LoadError> {
    if !path.exists() {
        // File doesn't exist yet, start empty
        return Ok(Loaded::default());
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let values: Vec<Value> = serde_json::from_str(&content).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded_at = now();
    let mut tasks = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();

    for (position, value) in values.iter().enumerate() {
        match value.as_object() {
            Some(object) => {
                let task = decode_task(object, loaded_at);
                if !has_text(object) {
                    warn!(file = ?path, position, "Entry has no task text, keeping it as a placeholder");
                }
                tasks.push(task);
            }
            None => {
                warn!(file = ?path, position, "Skipping entry that is not a task object");
                skipped.push(position);
            }
        }
    }

    info!(file = ?path, count = tasks.len(), skipped = skipped.len(), "Loaded tasks from JSON");

    let warning = (!skipped.is_empty()).then(|| LoadError::InvalidRecords {
        path: path.to_path_buf(),
        positions: skipped,
    });

    Ok(Loaded { tasks, warning })
}

/// Write all tasks to `path`, replacing the previous document atomically
pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<(), SaveError> {
    let Some(file_name) = path.file_name() else {
        return Err(SaveError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path does not name a file"),
        });
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SaveError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(tasks)?;

    let tmp_path = temp_path_for(path, file_name);
    let result = write_and_sync(&tmp_path, json.as_bytes()).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(SaveError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(file = ?path, count = tasks.len(), "Wrote tasks to JSON");

    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.write_all(b"\n")?;
    file.sync_all()?; // Ensure data is flushed to disk before the rename
    Ok(())
}

/// Sibling file the document is staged in before being renamed into place
fn temp_path_for(path: &Path, file_name: &OsStr) -> PathBuf {
    let mut name = file_name.to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn has_text(object: &Map<String, Value>) -> bool {
    object
        .get("task")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn decode_task(object: &Map<String, Value>, loaded_at: Timestamp) -> Task {
    let text = object
        .get("task")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER_TEXT);

    let done = object.get("done").and_then(Value::as_bool).unwrap_or(false);

    let priority = object
        .get("priority")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Priority>().ok())
        .unwrap_or_default();

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<TaskId>().ok())
        .unwrap_or_default();

    let created_at = timestamp_field(object, "created").unwrap_or(loaded_at);

    // completed is present iff done
    let completed_at = if done {
        Some(timestamp_field(object, "completed").unwrap_or(created_at))
    } else {
        None
    };

    Task {
        id,
        text: text.to_string(),
        done,
        priority,
        created_at,
        completed_at,
        edited_at: timestamp_field(object, "edited"),
    }
}

fn timestamp_field(object: &Map<String, Value>, key: &str) -> Option<Timestamp> {
    let raw = object.get(key).and_then(Value::as_str)?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            // Naive local-style timestamps without an offset are read as UTC
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()
}
