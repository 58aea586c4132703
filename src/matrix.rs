//! Category × priority index over tasks.
//!
//! `TaskMatrix` is a derived view: it holds copies of tasks grouped by
//! category and then priority. It is never updated by the store; callers clear
//! and rebuild it from the store before each use.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::store::TaskStore;
use crate::task::Task;

/// Category used for tasks whose category is empty.
pub const FALLBACK_CATEGORY: &str = "Default";

/// Tasks grouped by category, then by priority.
///
/// Both levels are ordered maps, so categories come out alphabetically and
/// priorities in ascending numeric order.
#[derive(Debug, Default, Clone)]
pub struct TaskMatrix {
    cells: BTreeMap<String, BTreeMap<u8, Vec<Task>>>,
}

impl TaskMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh matrix from the store's current tasks.
    pub fn from_store(store: &TaskStore) -> Self {
        let mut matrix = Self::new();
        matrix.rebuild(store);
        matrix
    }

    /// Clear and refill from the store.
    pub fn rebuild(&mut self, store: &TaskStore) {
        self.clear();
        for task in store.tasks() {
            self.add_task(task);
        }
    }

    /// Append a copy of `task` to its (category, priority) bucket.
    pub fn add_task(&mut self, task: &Task) {
        let category = match task.category() {
            "" => FALLBACK_CATEGORY,
            c => c,
        };
        self.cells
            .entry(category.to_string())
            .or_default()
            .entry(task.priority())
            .or_default()
            .push(task.clone());
    }

    /// Remove the first task with this id from whichever bucket holds it.
    pub fn remove_task(&mut self, id: u64) -> bool {
        for priorities in self.cells.values_mut() {
            for tasks in priorities.values_mut() {
                if let Some(pos) = tasks.iter().position(|t| t.id() == id) {
                    tasks.remove(pos);
                    return true;
                }
            }
        }
        false
    }

    /// Tasks in one bucket; empty when either key is absent.
    pub fn get(&self, category: &str, priority: u8) -> &[Task] {
        self.cells
            .get(category)
            .and_then(|p| p.get(&priority))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn task_count(&self, category: &str, priority: u8) -> usize {
        self.get(category, priority).len()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.cells.contains_key(category)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.cells.keys().map(String::as_str).collect()
    }

    pub fn priorities(&self, category: &str) -> Vec<u8> {
        self.cells
            .get(category)
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default()
    }

    /// All buckets of one category, lowest priority first.
    pub fn buckets(&self, category: &str) -> impl Iterator<Item = (u8, &[Task])> + '_ {
        self.cells
            .get(category)
            .into_iter()
            .flat_map(|p| p.iter().map(|(prio, tasks)| (*prio, tasks.as_slice())))
    }

    pub fn total_task_count(&self) -> usize {
        self.cells
            .values()
            .flat_map(|p| p.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_task_count() == 0
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Print every bucket, grouped by category.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Task Matrix")?;
        writeln!(out, "===========")?;
        for category in self.categories() {
            writeln!(out, "Category: {category}")?;
            for (priority, tasks) in self.buckets(category) {
                writeln!(out, "  Priority {priority}: {} task(s)", tasks.len())?;
                for t in tasks {
                    writeln!(out, "    [{}] {}", t.id(), t.title())?;
                }
            }
        }
        Ok(())
    }
}
