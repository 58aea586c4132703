//! # tt - Task Tracker
//!
//! A single-user command-line task tracker. Tasks live in memory while the
//! program runs and persist to a small, self-describing JSON file.
//!
//! ## Key Features
//!
//! - **Tasks**: title, description, status, category, priority (0-10) and
//!   creation/update/completion timestamps
//! - **Matrix view**: tasks grouped by category and priority, with direct
//!   bucket lookup
//! - **Two surfaces**: an interactive shell and one-shot subcommands that
//!   share the same command set
//! - **Board**: a read-only terminal UI over the matrix
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive shell on ./tasks.json
//! tt
//!
//! # One-shot commands
//! tt add "Write report" "Quarterly numbers"
//! tt priority 1 8
//! tt category 1 Work
//! tt matrix
//!
//! # Board
//! tt ui
//! ```
//!
//! The data file defaults to `tasks.json` in the working directory and can be
//! changed with `--file` or `TASK_TRACKER_FILE`.

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod json;
pub mod matrix;
pub mod repl;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod run;
}
