use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::task::TaskRecord;

/// Error type for positional list operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("index {index} out of range for list of {len} tasks")]
    OutOfRange { index: usize, len: usize },
}

/// An ordered list of tasks, optionally tied to the file it came from.
///
/// Positions are 0-based; the `safe_*` accessors take the 1-based numbers
/// users see in listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<TaskRecord>,
    path: Option<PathBuf>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list that persists to `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        TaskList {
            tasks: Vec::new(),
            path: Some(path.into()),
        }
    }

    pub fn from_tasks(tasks: Vec<TaskRecord>, path: Option<PathBuf>) -> Self {
        TaskList { tasks, path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskRecord> {
        self.tasks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TaskRecord> {
        self.tasks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TaskRecord> {
        self.tasks.get_mut(index)
    }

    /// Append, or replace an equal task where it stands. Returns the
    /// 0-based position the task ended up at.
    pub fn append(&mut self, task: TaskRecord) -> usize {
        match self.tasks.iter().position(|existing| *existing == task) {
            Some(index) => {
                self.tasks[index] = task;
                index
            }
            None => {
                self.tasks.push(task);
                self.tasks.len() - 1
            }
        }
    }

    /// Append each task with the same merge rule as [`TaskList::append`].
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = TaskRecord>) {
        for task in tasks {
            self.append(task);
        }
    }

    pub fn insert_at(&mut self, index: usize, task: TaskRecord) -> Result<(), ListError> {
        if index > self.tasks.len() {
            return Err(ListError::OutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        self.tasks.insert(index, task);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<TaskRecord, ListError> {
        if index >= self.tasks.len() {
            return Err(ListError::OutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(self.tasks.remove(index))
    }

    /// Remove the first task equal to `task`.
    pub fn remove(&mut self, task: &TaskRecord) -> Option<TaskRecord> {
        let index = self.tasks.iter().position(|existing| existing == task)?;
        Some(self.tasks.remove(index))
    }

    /// 1-based lookup; `None` when out of range.
    pub fn safe_get(&self, number: usize) -> Option<&TaskRecord> {
        number.checked_sub(1).and_then(|i| self.tasks.get(i))
    }

    pub fn safe_get_mut(&mut self, number: usize) -> Option<&mut TaskRecord> {
        number.checked_sub(1).and_then(|i| self.tasks.get_mut(i))
    }

    /// 1-based removal; `None` when out of range.
    pub fn safe_pop(&mut self, number: usize) -> Option<TaskRecord> {
        let index = number.checked_sub(1)?;
        (index < self.tasks.len()).then(|| self.tasks.remove(index))
    }

    /// Stable sort by the task order. Returns whether anything moved.
    pub fn sort(&mut self) -> bool {
        if self.tasks.is_sorted() {
            return false;
        }
        self.tasks.sort();
        true
    }

    /// Drop later duplicates, keeping the first of each. Returns the number
    /// of tasks removed.
    pub fn deduplicate(&mut self) -> usize {
        let before = self.tasks.len();
        let mut kept: Vec<TaskRecord> = Vec::with_capacity(before);
        for task in self.tasks.drain(..) {
            if !kept.contains(&task) {
                kept.push(task);
            }
        }
        self.tasks = kept;
        before - self.tasks.len()
    }

    /// Every context tag used in the list, sorted and unique.
    pub fn contexts(&self) -> BTreeSet<&str> {
        self.tasks.iter().flat_map(|t| t.contexts()).collect()
    }

    /// Every project tag used in the list, sorted and unique.
    pub fn projects(&self) -> BTreeSet<&str> {
        self.tasks.iter().flat_map(|t| t.projects()).collect()
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a TaskRecord;
    type IntoIter = std::slice::Iter<'a, TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

impl IntoIterator for TaskList {
    type Item = TaskRecord;
    type IntoIter = std::vec::IntoIter<TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}
