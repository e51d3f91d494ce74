// Query filtering over the task sequence

use crate::models::Task;
use std::fmt;
use std::iter::Enumerate;
use std::slice::Iter;
use std::str::FromStr;

/// Completion filter for queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,    // done == false
    Completed, // done == true
}

impl StatusFilter {
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.done,
            StatusFilter::Completed => task.done,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(format!("unknown filter '{}' (expected all, active or completed)", other)),
        }
    }
}

/// Lazy view over the tasks matching a filter and search term
///
/// Yields `(index, task)` where `index` is the task's position in the full
/// sequence, so it can be handed straight back to the positional store
/// operations. A clone taken before iterating walks the same view again.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    inner: Enumerate<Iter<'a, Task>>,
    filter: StatusFilter,
    needle: String,
}

impl<'a> Matches<'a> {
    pub(crate) fn new(tasks: &'a [Task], filter: StatusFilter, search: &str) -> Self {
        Self {
            inner: tasks.iter().enumerate(),
            filter,
            needle: search.to_lowercase(),
        }
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = (usize, &'a Task);

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        let needle = self.needle.as_str();
        self.inner
            .by_ref()
            .find(|(_, task)| filter.accepts(task) && task.matches_lowercase(needle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl std::iter::FusedIterator for Matches<'_> {}
