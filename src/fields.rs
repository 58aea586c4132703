//! Enumerations and field types for tasks.
//!
//! This module defines the task lifecycle status, its parsing from user input
//! and from the data file, and the sort keys offered by the command surface.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Completed,
        Status::Cancelled,
    ];

    /// Canonical name as written to the data file.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "InProgress",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
        }
    }

    /// Human-readable label for console output.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
        }
    }

    /// Parse a status name as typed by a user or found in a data file.
    ///
    /// Accepts the canonical names, the legacy "In Progress" spelling and the
    /// short command forms (`progress`, `done`, ...), case-insensitively.
    pub fn parse(s: &str) -> Option<Status> {
        let normalised = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalised.as_str() {
            "pending" | "todo" => Some(Status::Pending),
            "inprogress" | "in-progress" | "progress" => Some(Status::InProgress),
            "completed" | "complete" | "done" => Some(Status::Completed),
            "cancelled" | "canceled" => Some(Status::Cancelled),
            _ => None,
        }
    }
}

impl Status {
    /// Parse a status as stored in the data file: the canonical names plus
    /// the legacy "In Progress" spelling, matched exactly.
    pub fn from_file_name(s: &str) -> Option<Status> {
        match s {
            "Pending" => Some(Status::Pending),
            "InProgress" | "In Progress" => Some(Status::InProgress),
            "Completed" => Some(Status::Completed),
            "Cancelled" => Some(Status::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s).ok_or(TaskError::InvalidStatus)
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    /// Highest priority first.
    Priority,
    /// Newest first.
    Created,
    /// Alphabetical by title.
    Title,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_command_and_file_spellings() {
        assert_eq!(Status::parse("pending"), Some(Status::Pending));
        assert_eq!(Status::parse("Pending"), Some(Status::Pending));
        assert_eq!(Status::parse("progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("in-progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("InProgress"), Some(Status::InProgress));
        assert_eq!(Status::parse("In Progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("done"), Some(Status::Completed));
        assert_eq!(Status::parse("Cancelled"), Some(Status::Cancelled));
        assert_eq!(Status::parse("canceled"), Some(Status::Cancelled));
        assert_eq!(Status::parse("finished"), None);
        assert_eq!(Status::parse(""), None);
    }

    #[test]
    fn canonical_names_parse_back() {
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
            assert_eq!(Status::parse(status.label()), Some(status));
        }
    }

    #[test]
    fn file_names_are_matched_exactly() {
        for status in Status::ALL {
            assert_eq!(Status::from_file_name(status.as_str()), Some(status));
        }
        assert_eq!(Status::from_file_name("In Progress"), Some(Status::InProgress));
        for loose in ["todo", "done", "complete", "canceled", "PENDING", " Pending", "progress"] {
            assert_eq!(Status::from_file_name(loose), None, "{loose}");
        }
    }

    #[test]
    fn from_str_reports_invalid_status() {
        assert_eq!("bogus".parse::<Status>(), Err(TaskError::InvalidStatus));
        assert_eq!("completed".parse::<Status>(), Ok(Status::Completed));
    }
}
