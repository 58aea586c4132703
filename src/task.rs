//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single unit of
//! work, its validating setters, and the timestamp helpers shared with the
//! JSON codec.

use std::fmt;

use chrono::{DateTime, Local, Timelike};
use serde::Serialize;

use crate::error::TaskError;
use crate::fields::Status;

/// Maximum number of characters in a task title.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum number of characters in a task description.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Highest accepted priority; the lowest is 0.
pub const MAX_PRIORITY: u8 = 10;
/// Category assigned to every new task.
pub const DEFAULT_CATEGORY: &str = "General";

/// Current local time truncated to whole milliseconds, the precision the
/// data file stores.
pub fn now() -> DateTime<Local> {
    let now = Local::now();
    now.with_nanosecond(now.timestamp_subsec_millis() * 1_000_000)
        .unwrap_or(now)
}

/// Check a title against the emptiness and length rules.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::TitleTooLong);
    }
    Ok(())
}

/// Check a description against the length rule.
pub fn validate_description(description: &str) -> Result<(), TaskError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(TaskError::DescriptionTooLong);
    }
    Ok(())
}

/// A unit of work with status, category, priority and timestamps.
///
/// Tasks are only created by [`crate::store::TaskStore::add_task`] or by
/// loading a data file. Every setter validates its input on its own and bumps
/// `updated_at` when it succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    id: u64,
    title: String,
    description: String,
    status: Status,
    category: String,
    priority: u8,
    created_at: DateTime<Local>,
    updated_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Local>>,
}

/// Raw field values of a task as read back from the data file.
#[derive(Debug, Clone)]
pub(crate) struct TaskRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub category: String,
    pub priority: u8,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    pub completed_at: Option<DateTime<Local>>,
}

impl From<TaskRecord> for Task {
    fn from(r: TaskRecord) -> Self {
        Task {
            id: r.id,
            title: r.title,
            description: r.description,
            status: r.status,
            category: r.category,
            priority: r.priority,
            created_at: r.created_at,
            // A hand-edited file may carry an older update stamp.
            updated_at: r.updated_at.max(r.created_at),
            completed_at: r.completed_at,
        }
    }
}

impl Task {
    pub(crate) fn new(id: u64, title: String, description: String) -> Self {
        let now = now();
        Task {
            id,
            title,
            description,
            status: Status::Pending,
            category: DEFAULT_CATEGORY.to_string(),
            priority: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Local> {
        self.updated_at
    }

    /// When the task was last set to Completed, if ever.
    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Time elapsed since the task was created.
    pub fn age(&self) -> chrono::Duration {
        Local::now() - self.created_at
    }

    fn touch(&mut self) {
        self.updated_at = now().max(self.created_at);
    }

    /// Replace the title. Blank or overlong titles are rejected.
    pub fn set_title(&mut self, title: &str) -> Result<(), TaskError> {
        validate_title(title)?;
        self.title = title.to_string();
        self.touch();
        Ok(())
    }

    /// Replace the description. Overlong descriptions are rejected.
    pub fn set_description(&mut self, description: &str) -> Result<(), TaskError> {
        validate_description(description)?;
        self.description = description.to_string();
        self.touch();
        Ok(())
    }

    /// Set the status. Moving to Completed (again) restamps `completed_at`;
    /// moving away from it keeps the last completion time.
    pub fn set_status(&mut self, status: Status) -> Result<(), TaskError> {
        if status == Status::Completed {
            self.mark_completed();
        } else {
            self.status = status;
            self.touch();
        }
        Ok(())
    }

    /// Set the priority, which must lie in `0..=10`.
    pub fn set_priority(&mut self, priority: i64) -> Result<(), TaskError> {
        let priority = u8::try_from(priority)
            .ok()
            .filter(|p| *p <= MAX_PRIORITY)
            .ok_or(TaskError::InvalidPriority)?;
        self.priority = priority;
        self.touch();
        Ok(())
    }

    /// Replace the category verbatim.
    pub fn set_category(&mut self, category: &str) -> Result<(), TaskError> {
        self.category = category.to_string();
        self.touch();
        Ok(())
    }

    /// Complete the task, restamping `completed_at` with the update time.
    pub fn mark_completed(&mut self) {
        self.status = Status::Completed;
        self.touch();
        self.completed_at = Some(self.updated_at);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const STAMP: &str = "%Y-%m-%d %H:%M:%S";
        writeln!(f, "Task [ID: {}]", self.id)?;
        writeln!(f, "  Title:       {}", self.title)?;
        writeln!(
            f,
            "  Description: {}",
            if self.description.is_empty() { "None" } else { &self.description }
        )?;
        writeln!(f, "  Status:      {}", self.status)?;
        writeln!(f, "  Category:    {}", self.category)?;
        writeln!(f, "  Priority:    {}", self.priority)?;
        writeln!(f, "  Created:     {}", self.created_at.format(STAMP))?;
        write!(f, "  Updated:     {}", self.updated_at.format(STAMP))?;
        if let Some(done) = self.completed_at {
            write!(f, "\n  Completed:   {}", done.format(STAMP))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn task() -> Task {
        Task::new(1, "Write report".into(), String::new())
    }

    #[test]
    fn new_task_has_defaults() {
        let t = task();
        assert_eq!(t.status(), Status::Pending);
        assert_eq!(t.category(), "General");
        assert_eq!(t.priority(), 0);
        assert_eq!(t.created_at(), t.updated_at());
        assert!(t.completed_at().is_none());
    }

    #[test]
    fn now_is_truncated_to_milliseconds() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn set_priority_accepts_bounds_and_rejects_outside() {
        let mut t = task();
        assert!(t.set_priority(0).is_ok());
        assert!(t.set_priority(10).is_ok());
        assert_eq!(t.priority(), 10);

        let before = t.updated_at();
        sleep(Duration::from_millis(3));
        assert_eq!(t.set_priority(11), Err(TaskError::InvalidPriority));
        assert_eq!(t.set_priority(-1), Err(TaskError::InvalidPriority));
        assert_eq!(t.set_priority(i64::MAX), Err(TaskError::InvalidPriority));
        assert_eq!(t.priority(), 10);
        assert_eq!(t.updated_at(), before);
    }

    #[test]
    fn completing_twice_restamps_completed_at() {
        let mut t = task();
        t.set_status(Status::Completed).unwrap();
        let first = t.completed_at().unwrap();

        sleep(Duration::from_millis(5));
        t.set_status(Status::InProgress).unwrap();
        assert_eq!(t.completed_at(), Some(first));

        sleep(Duration::from_millis(5));
        t.mark_completed();
        let second = t.completed_at().unwrap();
        assert!(second > first);
        assert!(t.updated_at() >= t.created_at());
    }

    #[test]
    fn set_title_rejects_blank_and_overlong() {
        let mut t = task();
        assert_eq!(t.set_title(""), Err(TaskError::EmptyTitle));
        assert_eq!(t.set_title("   "), Err(TaskError::EmptyTitle));
        assert_eq!(t.set_title(&"x".repeat(101)), Err(TaskError::TitleTooLong));
        assert_eq!(t.title(), "Write report");
        assert!(t.set_title(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn set_description_enforces_length() {
        let mut t = task();
        assert!(t.set_description("").is_ok());
        assert!(t.set_description(&"d".repeat(500)).is_ok());
        assert_eq!(
            t.set_description(&"d".repeat(501)),
            Err(TaskError::DescriptionTooLong)
        );
    }

    #[test]
    fn set_category_is_verbatim() {
        let mut t = task();
        t.set_category("  Home ").unwrap();
        assert_eq!(t.category(), "  Home ");
        t.set_category("").unwrap();
        assert_eq!(t.category(), "");
    }

    #[test]
    fn display_lists_completion_only_when_present() {
        let mut t = task();
        assert!(!t.to_string().contains("Completed:"));
        assert!(t.to_string().contains("Description: None"));
        t.mark_completed();
        assert!(t.to_string().contains("Completed:"));
    }
}
