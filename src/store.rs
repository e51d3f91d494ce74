// Task store backed by a single JSON document

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{debug, info, warn};

use crate::error::{LoadError, SaveError, StoreError, ValidationError};
use crate::filter::{Matches, StatusFilter};
use crate::json;
use crate::models::{Priority, Task, TaskId, normalize_text, now};

/// Notification sent to subscribers after each applied mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { index: usize, id: TaskId },
    Toggled { index: usize, done: bool },
    MarkedDone { index: usize },
    Edited { index: usize },
    Deleted { index: usize, id: TaskId },
    Cleared { removed: usize },
}

/// Task counts for a summary line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Ordered list of tasks, written back to its file after every mutation
///
/// Tasks are addressed by their position in the list. Positions shift on
/// `delete` and `clear_completed`, so positions obtained from [`TaskStore::query`]
/// must not be reused across a mutating call. The `_by_id` variants address a
/// task by its stable [`TaskId`] instead.
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    load_warning: Option<LoadError>,
    subscribers: Vec<Sender<Change>>,
}

impl TaskStore {
    /// Open the store backed by the JSON document at `path`
    ///
    /// Never fails: an unreadable or malformed document is discarded and the
    /// store starts empty, with the reason available from [`TaskStore::load_warning`].
    /// Entries that are not task objects are dropped and reported the same way.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let (tasks, load_warning) = match json::read_tasks(&path) {
            Ok(loaded) => {
                if let Some(e) = &loaded.warning {
                    warn!(file = ?path, error = %e, "Some entries could not be loaded");
                }
                (loaded.tasks, loaded.warning)
            }
            Err(e) => {
                warn!(file = ?path, error = %e, "Discarding unreadable task file, starting empty");
                (Vec::new(), Some(e))
            }
        };

        Self {
            path,
            tasks,
            load_warning,
            subscribers: Vec::new(),
        }
    }

    /// Path of the backing JSON document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the backing file, or part of it, was discarded at open
    pub fn load_warning(&self) -> Option<&LoadError> {
        self.load_warning.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn get_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn stats(&self) -> Stats {
        let completed = self.tasks.iter().filter(|t| t.done).count();
        Stats {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Receive a [`Change`] after every mutation applied from now on
    pub fn subscribe(&mut self) -> Receiver<Change> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the whole list to the backing file
    ///
    /// Called after every mutation; public so a caller can retry after a
    /// failed write.
    pub fn save(&self) -> Result<(), SaveError> {
        json::write_tasks(&self.path, &self.tasks)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Append a new open task and return its id
    pub fn add(&mut self, text: &str, priority: Priority) -> Result<TaskId, StoreError> {
        let text = normalize_text(text).ok_or(ValidationError::BlankText)?;

        let task = Task::new(text, priority, now());
        let id = task.id;
        self.tasks.push(task);

        let index = self.tasks.len() - 1;
        debug!(index, %id, %priority, "Added task");
        self.commit(Change::Added { index, id })?;
        Ok(id)
    }

    /// Flip the done flag of the task at `index`
    pub fn toggle_done(&mut self, index: usize) -> Result<(), StoreError> {
        self.check_index(index)?;

        let task = &mut self.tasks[index];
        task.toggle(now());
        let done = task.done;

        debug!(index, done, "Toggled task");
        self.commit(Change::Toggled { index, done })
    }

    /// Mark the task at `index` done, restamping `completed_at` even if it
    /// already was
    pub fn mark_done(&mut self, index: usize) -> Result<(), StoreError> {
        self.check_index(index)?;

        self.tasks[index].mark_done(now());

        debug!(index, "Marked task done");
        self.commit(Change::MarkedDone { index })
    }

    /// Replace the text of the task at `index`
    pub fn edit(&mut self, index: usize, new_text: &str) -> Result<(), StoreError> {
        self.check_index(index)?;
        let text = normalize_text(new_text).ok_or(ValidationError::BlankText)?;

        self.tasks[index].set_text(text, now());

        debug!(index, "Edited task");
        self.commit(Change::Edited { index })
    }

    /// Remove and return the task at `index`. Later tasks move down by one.
    pub fn delete(&mut self, index: usize) -> Result<Task, StoreError> {
        self.check_index(index)?;

        let task = self.tasks.remove(index);

        debug!(index, id = %task.id, "Deleted task");
        self.commit(Change::Deleted { index, id: task.id })?;
        Ok(task)
    }

    /// Remove every completed task, keeping the order of the rest
    ///
    /// Saves once, even when nothing was removed. Returns the number removed.
    pub fn clear_completed(&mut self) -> Result<usize, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.done);
        let removed = before - self.tasks.len();

        info!(removed, remaining = self.tasks.len(), "Cleared completed tasks");
        self.commit(Change::Cleared { removed })?;
        Ok(removed)
    }

    pub fn toggle_done_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        let index = self.resolve(id)?;
        self.toggle_done(index)
    }

    pub fn mark_done_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        let index = self.resolve(id)?;
        self.mark_done(index)
    }

    pub fn edit_by_id(&mut self, id: TaskId, new_text: &str) -> Result<(), StoreError> {
        let index = self.resolve(id)?;
        self.edit(index, new_text)
    }

    pub fn delete_by_id(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let index = self.resolve(id)?;
        self.delete(index)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tasks passing `filter` whose text contains `search` (case-insensitive),
    /// paired with their position in the full list
    pub fn query<'a>(&'a self, filter: StatusFilter, search: &str) -> Matches<'a> {
        Matches::new(&self.tasks, filter, search)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index < self.tasks.len() {
            Ok(())
        } else {
            Err(ValidationError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            })
        }
    }

    fn resolve(&self, id: TaskId) -> Result<usize, ValidationError> {
        self.index_of(id).ok_or(ValidationError::UnknownId(id))
    }

    /// Notify subscribers of an applied change, then persist
    fn commit(&mut self, change: Change) -> Result<(), StoreError> {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());

        if let Err(e) = self.save() {
            warn!(file = ?self.path, error = %e, "Failed to save tasks, keeping in-memory changes");
            return Err(e.into());
        }
        Ok(())
    }
}
