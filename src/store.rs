//! Task store and utility functions for task management.
//!
//! This module provides the `TaskStore` struct that owns the ordered task list
//! and the id counter, along with helpers for statistics and table output.

use std::cmp::Ordering;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{JsonError, TaskError};
use crate::fields::Status;
use crate::json;
use crate::task::{validate_description, validate_title, Task};

/// Authoritative in-memory collection of tasks.
///
/// Insertion order is the canonical iteration order. `next_id` is always
/// greater than every id ever issued, removed tasks included.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub cancelled: usize,
    pub completion_rate: f64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task and return its freshly allocated id.
    ///
    /// The title must be non-blank and not already used by another task
    /// (exact, case-sensitive match). On failure the store is unchanged.
    pub fn add_task(&mut self, title: &str, description: &str) -> Result<u64, TaskError> {
        validate_title(title)?;
        validate_description(description)?;
        if self.tasks.iter().any(|t| t.title() == title) {
            return Err(TaskError::DuplicateTask);
        }

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
        self.next_id = next_id;
        self.tasks
            .push(Task::new(id, title.to_string(), description.to_string()));
        info!(id, title, "task added");
        Ok(id)
    }

    /// Remove the task with the given id. Remaining ids are untouched.
    pub fn remove_task(&mut self, id: u64) -> Result<(), TaskError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id() == id)
            .ok_or(TaskError::TaskNotFound)?;
        self.tasks.remove(idx);
        info!(id, "task removed");
        Ok(())
    }

    /// Get a copy of a task by id.
    pub fn get_task(&self, id: u64) -> Result<Task, TaskError> {
        self.get(id).cloned().ok_or(TaskError::TaskNotFound)
    }

    /// Borrow a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Borrow a task mutably by id, for use with the task's own setters.
    pub fn get_mut(&mut self, id: u64) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(TaskError::TaskNotFound)
    }

    /// Set a task's status; fails only when the id is unknown.
    pub fn update_status(&mut self, id: u64, status: Status) -> Result<(), TaskError> {
        self.get_mut(id)?.set_status(status)?;
        debug!(id, status = status.as_str(), "status updated");
        Ok(())
    }

    /// Lazily iterate over tasks matching `pred`, in store order.
    ///
    /// The view borrows the store, so it cannot outlive a mutation.
    pub fn filter_tasks<'a, P>(&'a self, mut pred: P) -> impl Iterator<Item = &'a Task> + 'a
    where
        P: FnMut(&Task) -> bool + 'a,
    {
        self.tasks.iter().filter(move |t| pred(t))
    }

    pub fn tasks_by_status(&self, status: Status) -> impl Iterator<Item = &Task> + '_ {
        self.filter_tasks(move |t| t.status() == status)
    }

    /// Tasks whose priority lies in `min..=max`.
    pub fn tasks_by_priority(&self, min: u8, max: u8) -> impl Iterator<Item = &Task> + '_ {
        self.filter_tasks(move |t| (min..=max).contains(&t.priority()))
    }

    /// Return a sorted copy of all tasks. The sort is stable and leaves the
    /// store's own order alone.
    pub fn sorted_tasks<F>(&self, compare: F) -> Vec<Task>
    where
        F: FnMut(&Task, &Task) -> Ordering,
    {
        let mut sorted = self.tasks.clone();
        sorted.sort_by(compare);
        sorted
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

    /// The id the next added task will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn count_status(&self, status: Status) -> usize {
        self.tasks_by_status(status).count()
    }

    pub fn completed_count(&self) -> usize {
        self.count_status(Status::Completed)
    }

    pub fn pending_count(&self) -> usize {
        self.count_status(Status::Pending)
    }

    /// Percentage of completed tasks; 0.0 for an empty store.
    pub fn completion_rate(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.tasks.len() as f64 * 100.0
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.len(),
            completed: self.completed_count(),
            pending: self.pending_count(),
            in_progress: self.count_status(Status::InProgress),
            cancelled: self.count_status(Status::Cancelled),
            completion_rate: self.completion_rate(),
        }
    }

    /// Swap in decoded contents, keeping the id counter above every id.
    pub(crate) fn replace(&mut self, tasks: Vec<Task>, next_id: u64) {
        let floor = tasks
            .iter()
            .map(Task::id)
            .max()
            .map_or(1, |id| id.saturating_add(1));
        self.tasks = tasks;
        self.next_id = next_id.max(floor);
    }

    /// Write the store to `path` in the JSON data format.
    pub fn save(&self, path: &Path) -> Result<(), JsonError> {
        json::save_to_file(self, path)
    }

    /// Replace the store's contents with the data file at `path`.
    pub fn load(&mut self, path: &Path) -> Result<(), JsonError> {
        json::load_from_file(self, path)
    }
}

/// Print tasks as an aligned table.
pub fn print_table<W: Write>(out: &mut W, tasks: &[&Task]) -> io::Result<()> {
    writeln!(
        out,
        "{:<5} {:<12} {:<4} {:<14} {}",
        "ID", "Status", "Pri", "Category", "Title"
    )?;
    for t in tasks {
        writeln!(
            out,
            "{:<5} {:<12} {:<4} {:<14} {}",
            t.id(),
            t.status().label(),
            t.priority(),
            truncate(t.category(), 14),
            t.title()
        )?;
    }
    Ok(())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
