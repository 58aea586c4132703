//! Command implementations for the CLI and the interactive shell.
//!
//! Every task command is a `cmd_*` handler over a [`Session`], which owns the
//! store, the matrix view and the configured data file. Handlers write their
//! output to any `io::Write` and return errors instead of exiting, so the
//! shell can keep going after a failed command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::error::{Error, Result, TaskError};
use crate::fields::{SortKey, Status};
use crate::json::{self as codec, FileSummary};
use crate::matrix::TaskMatrix;
use crate::store::{print_table, truncate, TaskStore};
use crate::task::Task;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive shell (the default).
    Shell,

    /// Browse the category/priority matrix in a terminal UI.
    Ui,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    #[command(flatten)]
    Task(TaskCommand),
}

/// Commands shared by the one-shot CLI and the interactive shell.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TaskCommand {
    /// Add a new task.
    Add {
        /// Task title.
        title: String,
        /// Optional longer description.
        description: Option<String>,
    },

    /// List all tasks, or only those with one status.
    #[command(alias = "ls")]
    List {
        /// pending | progress | completed | cancelled
        status: Option<String>,
    },

    /// Show one task in detail.
    Show {
        id: String,
    },

    /// Mark a task as completed.
    #[command(alias = "done")]
    Complete {
        id: String,
    },

    /// Remove a task.
    #[command(alias = "rm")]
    Remove {
        id: String,
    },

    /// Change a task's status.
    Status {
        id: String,
        /// pending | progress | completed | cancelled
        status: String,
    },

    /// Set a task's priority (0-10).
    Priority {
        id: String,
        #[arg(allow_hyphen_values = true)]
        priority: String,
    },

    /// Set a task's category.
    Category {
        id: String,
        category: String,
    },

    /// Change a task's title.
    Rename {
        id: String,
        title: String,
    },

    /// Change a task's description.
    Describe {
        id: String,
        description: String,
    },

    /// Show task statistics.
    Stats,

    /// Find tasks whose title or description contains a keyword.
    Find {
        keyword: String,
    },

    /// List tasks sorted by priority, creation time or title.
    Sort {
        #[arg(value_enum)]
        by: SortKey,
    },

    /// Save tasks to a JSON file.
    Save {
        /// Defaults to the configured data file.
        file: Option<PathBuf>,
    },

    /// Load tasks from a JSON file, replacing the current ones.
    Load {
        /// Defaults to the configured data file.
        file: Option<PathBuf>,
    },

    /// Print a JSON file's contents as a table without loading it.
    View {
        /// Defaults to the configured data file.
        file: Option<PathBuf>,
    },

    /// Show tasks grouped by category and priority.
    Matrix,

    /// Show the tasks in one category at one priority.
    Get {
        category: String,
        #[arg(allow_hyphen_values = true)]
        priority: String,
    },
}

impl TaskCommand {
    /// Whether the command changes the store, so a one-shot run must write
    /// the data file back.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            TaskCommand::Add { .. }
                | TaskCommand::Complete { .. }
                | TaskCommand::Remove { .. }
                | TaskCommand::Status { .. }
                | TaskCommand::Priority { .. }
                | TaskCommand::Category { .. }
                | TaskCommand::Rename { .. }
                | TaskCommand::Describe { .. }
        )
    }
}

/// Working state for a run: the store, its matrix view and output options.
#[derive(Debug)]
pub struct Session {
    store: TaskStore,
    matrix: TaskMatrix,
    data_file: PathBuf,
    json: bool,
}

impl Session {
    /// Start with an empty store.
    pub fn new(data_file: &Path, json: bool) -> Self {
        Session {
            store: TaskStore::new(),
            matrix: TaskMatrix::new(),
            data_file: data_file.to_path_buf(),
            json,
        }
    }

    /// Start from the data file if it exists, otherwise empty.
    pub fn open(data_file: &Path, json: bool) -> Result<Self> {
        let mut session = Session::new(data_file, json);
        if data_file.exists() {
            session.store.load(data_file)?;
        }
        Ok(session)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Write the store to the configured data file.
    pub fn save_data_file(&self) -> Result<()> {
        self.store.save(&self.data_file)?;
        Ok(())
    }

    fn target(&self, file: Option<PathBuf>) -> PathBuf {
        file.unwrap_or_else(|| self.data_file.clone())
    }

    /// Run one task command.
    pub fn execute<W: Write>(&mut self, command: TaskCommand, out: &mut W) -> Result<()> {
        debug!(?command, "executing");
        match command {
            TaskCommand::Add { title, description } => {
                cmd_add(self, out, &title, description.as_deref().unwrap_or(""))
            }
            TaskCommand::List { status } => cmd_list(self, out, status.as_deref()),
            TaskCommand::Show { id } => cmd_show(self, out, &id),
            TaskCommand::Complete { id } => cmd_complete(self, out, &id),
            TaskCommand::Remove { id } => cmd_remove(self, out, &id),
            TaskCommand::Status { id, status } => cmd_status(self, out, &id, &status),
            TaskCommand::Priority { id, priority } => cmd_priority(self, out, &id, &priority),
            TaskCommand::Category { id, category } => cmd_category(self, out, &id, &category),
            TaskCommand::Rename { id, title } => cmd_rename(self, out, &id, &title),
            TaskCommand::Describe { id, description } => {
                cmd_describe(self, out, &id, &description)
            }
            TaskCommand::Stats => cmd_stats(self, out),
            TaskCommand::Find { keyword } => cmd_find(self, out, &keyword),
            TaskCommand::Sort { by } => cmd_sort(self, out, by),
            TaskCommand::Save { file } => {
                let path = self.target(file);
                cmd_save(self, out, &path)
            }
            TaskCommand::Load { file } => {
                let path = self.target(file);
                cmd_load(self, out, &path)
            }
            TaskCommand::View { file } => {
                let path = self.target(file);
                cmd_view(self, out, &path)
            }
            TaskCommand::Matrix => cmd_matrix(self, out),
            TaskCommand::Get { category, priority } => cmd_get(self, out, &category, &priority),
        }
    }
}

/// Parse a task id argument. Zero and negative ids are invalid.
pub fn parse_id(s: &str) -> Result<u64> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("'{s}' is not a valid task id")))?;
    if value <= 0 {
        return Err(TaskError::InvalidId.into());
    }
    Ok(value as u64)
}

/// Parse a priority argument. Range checking is left to the task setter.
pub fn parse_priority(s: &str) -> Result<i64> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("'{s}' is not a valid priority")))
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Add a new task to the store.
pub fn cmd_add<W: Write>(
    session: &mut Session,
    out: &mut W,
    title: &str,
    description: &str,
) -> Result<()> {
    let title = title.trim();
    let id = session.store.add_task(title, description)?;
    if session.json {
        return write_json(out, &json!({ "id": id, "title": title }));
    }
    writeln!(out, "Task '{title}' added with ID {id}")?;
    Ok(())
}

/// List all tasks, or those with a given status.
pub fn cmd_list<W: Write>(session: &Session, out: &mut W, status: Option<&str>) -> Result<()> {
    let store = &session.store;
    let filter = status.map(str::parse::<Status>).transpose()?;
    let tasks: Vec<&Task> = match filter {
        Some(s) => store.tasks_by_status(s).collect(),
        None => store.tasks().iter().collect(),
    };

    if session.json {
        return write_json(out, &tasks);
    }
    match filter {
        _ if store.is_empty() => writeln!(out, "No tasks available.")?,
        Some(s) if tasks.is_empty() => writeln!(out, "No tasks with status: {s}")?,
        Some(s) => {
            writeln!(out, "=== {s} Tasks ({} tasks) ===", tasks.len())?;
            print_table(out, &tasks)?;
        }
        None => {
            writeln!(out, "=== Task List ({} tasks) ===", tasks.len())?;
            print_table(out, &tasks)?;
            writeln!(out, "Completion Rate: {:.1}%", store.completion_rate())?;
        }
    }
    Ok(())
}

/// Show one task in detail.
pub fn cmd_show<W: Write>(session: &Session, out: &mut W, id: &str) -> Result<()> {
    let task = session.store.get_task(parse_id(id)?)?;
    if session.json {
        return write_json(out, &task);
    }
    writeln!(out, "{task}")?;
    Ok(())
}

/// Mark a task as completed.
pub fn cmd_complete<W: Write>(session: &mut Session, out: &mut W, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    session.store.update_status(id, Status::Completed)?;
    writeln!(out, "Task {id} marked as completed")?;
    Ok(())
}

/// Remove a task by id.
pub fn cmd_remove<W: Write>(session: &mut Session, out: &mut W, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    session.store.remove_task(id)?;
    writeln!(out, "Task {id} removed")?;
    Ok(())
}

/// Change a task's status.
pub fn cmd_status<W: Write>(
    session: &mut Session,
    out: &mut W,
    id: &str,
    status: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    let status: Status = status.parse()?;
    session.store.update_status(id, status)?;
    writeln!(out, "Task {id} status updated to {status}")?;
    Ok(())
}

/// Set a task's priority.
pub fn cmd_priority<W: Write>(
    session: &mut Session,
    out: &mut W,
    id: &str,
    priority: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    let priority = parse_priority(priority)?;
    session.store.get_mut(id)?.set_priority(priority)?;
    writeln!(out, "Task {id} priority set to {priority}")?;
    Ok(())
}

/// Set a task's category.
pub fn cmd_category<W: Write>(
    session: &mut Session,
    out: &mut W,
    id: &str,
    category: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    session.store.get_mut(id)?.set_category(category)?;
    writeln!(out, "Task {id} category set to '{category}'")?;
    Ok(())
}

/// Change a task's title, keeping titles unique.
pub fn cmd_rename<W: Write>(
    session: &mut Session,
    out: &mut W,
    id: &str,
    title: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    let title = title.trim();
    if session
        .store
        .filter_tasks(|t| t.title() == title && t.id() != id)
        .next()
        .is_some()
    {
        return Err(TaskError::DuplicateTask.into());
    }
    session.store.get_mut(id)?.set_title(title)?;
    writeln!(out, "Task {id} renamed to '{title}'")?;
    Ok(())
}

/// Change a task's description.
pub fn cmd_describe<W: Write>(
    session: &mut Session,
    out: &mut W,
    id: &str,
    description: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    session.store.get_mut(id)?.set_description(description)?;
    writeln!(out, "Task {id} description updated")?;
    Ok(())
}

/// Print task statistics.
pub fn cmd_stats<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    let stats = session.store.stats();
    if session.json {
        return write_json(out, &stats);
    }
    writeln!(out, "Task Statistics")?;
    writeln!(out, "===============")?;
    writeln!(out, "Total Tasks:     {}", stats.total)?;
    writeln!(out, "Completed:       {}", stats.completed)?;
    writeln!(out, "Pending:         {}", stats.pending)?;
    writeln!(out, "In Progress:     {}", stats.in_progress)?;
    writeln!(out, "Cancelled:       {}", stats.cancelled)?;
    writeln!(out, "Completion Rate: {:.1}%", stats.completion_rate)?;
    Ok(())
}

/// Case-insensitive keyword search over titles and descriptions.
pub fn cmd_find<W: Write>(session: &Session, out: &mut W, keyword: &str) -> Result<()> {
    let needle = keyword.to_lowercase();
    let matches: Vec<&Task> = session
        .store
        .filter_tasks(|t| {
            t.title().to_lowercase().contains(&needle)
                || t.description().to_lowercase().contains(&needle)
        })
        .collect();

    if session.json {
        return write_json(out, &matches);
    }
    if matches.is_empty() {
        writeln!(out, "No tasks found containing: '{keyword}'")?;
        return Ok(());
    }
    writeln!(out, "Found {} task(s) containing '{keyword}'", matches.len())?;
    for t in matches {
        writeln!(out, "  [{}] {} - {}", t.id(), t.title(), t.status())?;
    }
    Ok(())
}

/// List tasks in a chosen order.
pub fn cmd_sort<W: Write>(session: &Session, out: &mut W, by: SortKey) -> Result<()> {
    let store = &session.store;
    let sorted = match by {
        SortKey::Priority => store.sorted_tasks(|a, b| b.priority().cmp(&a.priority())),
        SortKey::Created => store.sorted_tasks(|a, b| b.created_at().cmp(&a.created_at())),
        SortKey::Title => store.sorted_tasks(|a, b| a.title().cmp(b.title())),
    };

    if session.json {
        return write_json(out, &sorted);
    }
    match by {
        SortKey::Priority => {
            writeln!(out, "Tasks sorted by priority (highest first):")?;
            for t in &sorted {
                writeln!(out, "  [{}] {} - Priority: {}", t.id(), t.title(), t.priority())?;
            }
        }
        SortKey::Created => {
            writeln!(out, "Tasks sorted by creation date (newest first):")?;
            for t in &sorted {
                let hours = t.age().num_seconds() as f64 / 3600.0;
                writeln!(out, "  [{}] {} - Age: {hours:.1} hours", t.id(), t.title())?;
            }
        }
        SortKey::Title => {
            writeln!(out, "Tasks sorted alphabetically:")?;
            for t in &sorted {
                writeln!(out, "  [{}] {}", t.id(), t.title())?;
            }
        }
    }
    Ok(())
}

/// Save the store to `path`.
pub fn cmd_save<W: Write>(session: &Session, out: &mut W, path: &Path) -> Result<()> {
    session.store.save(path)?;
    writeln!(out, "Tasks saved to {}", path.display())?;
    writeln!(out, "Total tasks saved: {}", session.store.len())?;
    Ok(())
}

/// Replace the store with the contents of `path`.
pub fn cmd_load<W: Write>(session: &mut Session, out: &mut W, path: &Path) -> Result<()> {
    session.store.load(path)?;
    let store = &session.store;
    writeln!(out, "Tasks loaded from {}", path.display())?;
    writeln!(out, "Total tasks loaded: {}", store.len())?;
    if !store.is_empty() {
        writeln!(out, "  Pending: {}", store.pending_count())?;
        writeln!(out, "  Completed: {}", store.completed_count())?;
        writeln!(out, "  Completion Rate: {:.1}%", store.completion_rate())?;
    }
    Ok(())
}

/// Print a data file as tables without loading it.
pub fn cmd_view<W: Write>(_session: &Session, out: &mut W, path: &Path) -> Result<()> {
    let text = codec::read_file(path)?;
    if text.trim().is_empty() {
        writeln!(out, "Note: {} is empty", path.display())?;
        return Ok(());
    }
    let summary = codec::summarize(&text)?;
    write_file_summary(out, &summary)?;
    Ok(())
}

fn write_file_summary<W: Write>(out: &mut W, summary: &FileSummary) -> io::Result<()> {
    writeln!(out, "File Information")?;
    writeln!(out, "  Version:   {}", summary.version.as_deref().unwrap_or("N/A"))?;
    writeln!(out, "  Next ID:   {}", summary.next_id.as_deref().unwrap_or("N/A"))?;
    writeln!(out, "  File Size: {} bytes", summary.size)?;

    let store = &summary.tasks;
    if store.is_empty() {
        writeln!(out, "No tasks found in the file.")?;
        return Ok(());
    }

    writeln!(out, "Tasks ({} total):", store.len())?;
    writeln!(
        out,
        "{:>4}  {:<19} {:<12} {:<11} {:>8}  {:<19}",
        "ID", "Title", "Status", "Category", "Priority", "Created At"
    )?;
    for t in store.tasks() {
        writeln!(
            out,
            "{:>4}  {:<19} {:<12} {:<11} {:>8}  {:<19}",
            t.id(),
            truncate(t.title(), 19),
            t.status().label(),
            truncate(t.category(), 11),
            t.priority(),
            t.created_at().format("%Y-%m-%dT%H:%M:%S")
        )?;
    }

    let stats = store.stats();
    writeln!(
        out,
        "Summary: Pending: {} | Completed: {} | In Progress: {} | Cancelled: {}",
        stats.pending, stats.completed, stats.in_progress, stats.cancelled
    )?;
    writeln!(out, "Completion Rate: {:.1}%", stats.completion_rate)?;
    Ok(())
}

/// Rebuild the matrix from the store and print it.
pub fn cmd_matrix<W: Write>(session: &mut Session, out: &mut W) -> Result<()> {
    session.matrix.rebuild(&session.store);
    let matrix = &session.matrix;
    if matrix.is_empty() {
        writeln!(out, "No tasks to display in matrix")?;
        return Ok(());
    }
    matrix.write_to(out)?;
    writeln!(out, "Total tasks: {}", matrix.total_task_count())?;
    writeln!(out, "Categories: {}", matrix.categories().len())?;
    Ok(())
}

/// Rebuild the matrix and print one (category, priority) bucket.
pub fn cmd_get<W: Write>(
    session: &mut Session,
    out: &mut W,
    category: &str,
    priority: &str,
) -> Result<()> {
    let priority = parse_priority(priority)?;
    session.matrix.rebuild(&session.store);
    let tasks = u8::try_from(priority)
        .map(|p| session.matrix.get(category, p))
        .unwrap_or(&[]);

    if session.json {
        return write_json(out, tasks);
    }
    if tasks.is_empty() {
        writeln!(out, "No tasks found for category '{category}' with priority {priority}")?;
        return Ok(());
    }
    writeln!(out, "Tasks in category '{category}' with priority {priority}:")?;
    for t in tasks {
        writeln!(out, "  [{}] {} - {}", t.id(), t.title(), t.status())?;
    }
    writeln!(out, "Found {} task(s)", tasks.len())?;
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Run a one-shot task command against the data file, writing it back when
/// the command changed anything.
pub fn cmd_once(data_file: &Path, json: bool, command: TaskCommand) -> Result<()> {
    let mut session = Session::open(data_file, json)?;
    let mutating = command.is_mutating();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.execute(command, &mut out)?;
    if mutating {
        if let Err(e) = session.save_data_file() {
            warn!(error = %e, "could not write data file");
            return Err(e);
        }
    }
    Ok(())
}
