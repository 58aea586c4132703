//! Interactive shell.
//!
//! Lines are split by [`tokenize`] and parsed with the same clap definitions
//! the one-shot CLI uses, so both surfaces accept identical commands.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::Path;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cmd::{Session, TaskCommand};
use crate::error::Result;

/// Number of command names kept for `recent`.
pub const MAX_RECENT_COMMANDS: usize = 10;

const PROMPT: &str = "tt> ";

/// Split a line into tokens.
///
/// Whitespace separates tokens. A double quote toggles a quoted span in which
/// whitespace is kept; the quote characters themselves are dropped and there
/// is no escaping.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        tokens.push(current);
    }
    tokens
}

#[derive(Parser, Debug)]
#[command(
    name = "tt",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
struct Line {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug)]
enum ReplCommand {
    /// Show the most recent commands, oldest first.
    Recent,

    /// Leave the shell.
    #[command(alias = "quit")]
    Exit,

    #[command(flatten)]
    Task(TaskCommand),
}

/// What the loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The shell state: a session plus the recent-command history.
pub struct Repl {
    session: Session,
    recent: VecDeque<String>,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Repl {
            session,
            recent: VecDeque::with_capacity(MAX_RECENT_COMMANDS),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Read lines until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Task Tracker")?;
        writeln!(out, "Data file: {}", self.session.data_file().display())?;
        writeln!(out, "Type 'help' to see available commands.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            if self.handle_line(&line?, out)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Parse and execute one line. Command failures are reported to `out`
    /// and never end the loop; only write errors on `out` propagate.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let tokens = tokenize(line);
        let Some(name) = tokens.first().cloned() else {
            return Ok(Flow::Continue);
        };

        let parsed = match Line::try_parse_from(&tokens) {
            Ok(parsed) => parsed,
            Err(e) => {
                if e.kind() != ErrorKind::DisplayHelp {
                    debug!(line, kind = ?e.kind(), "rejected input");
                }
                write!(out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };
        self.remember(name);

        match parsed.command {
            ReplCommand::Exit => {
                writeln!(out, "Goodbye.")?;
                Ok(Flow::Exit)
            }
            ReplCommand::Recent => {
                self.write_recent(out)?;
                Ok(Flow::Continue)
            }
            ReplCommand::Task(command) => {
                if let Err(e) = self.session.execute(command, out) {
                    debug!(error = %e, "command failed");
                    writeln!(out, "Error: {e}")?;
                }
                Ok(Flow::Continue)
            }
        }
    }

    fn remember(&mut self, name: String) {
        if self.recent.len() == MAX_RECENT_COMMANDS {
            self.recent.pop_front();
        }
        self.recent.push_back(name);
    }

    fn write_recent<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.recent.is_empty() {
            return writeln!(out, "No recent commands");
        }
        writeln!(out, "Recent commands:")?;
        for (i, name) in self.recent.iter().enumerate() {
            writeln!(out, "  {}. {name}", i + 1)?;
        }
        Ok(())
    }
}

/// Run the shell on stdin/stdout, starting from the data file if present.
pub fn cmd_shell(data_file: &Path, json: bool) -> Result<()> {
    let session = Session::open(data_file, json)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    Repl::new(session).run(stdin.lock(), &mut out)
}
