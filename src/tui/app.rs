//! Matrix board for the terminal user interface.
//!
//! `MatrixBoard` shows the category list on the left and the selected
//! category's tasks, grouped by ascending priority, on the right. The board
//! only reads the data file; `r` reloads it and rebuilds the matrix.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::error::Result;
use crate::matrix::TaskMatrix;
use crate::store::TaskStore;
use crate::tui::colors::{priority_color, status_color, BOARD_BLUE};

/// State for the read-only matrix board.
pub struct MatrixBoard {
    data_file: PathBuf,
    store: TaskStore,
    matrix: TaskMatrix,
    categories: Vec<String>,
    category_state: ListState,
    status_message: String,
}

impl MatrixBoard {
    /// Open the board on `data_file`. A missing file shows an empty board.
    pub fn new(data_file: &Path) -> Result<Self> {
        let mut board = MatrixBoard {
            data_file: data_file.to_path_buf(),
            store: TaskStore::new(),
            matrix: TaskMatrix::new(),
            categories: Vec::new(),
            category_state: ListState::default(),
            status_message: String::new(),
        };
        if data_file.exists() {
            board.store.load(data_file)?;
        }
        board.refresh();
        Ok(board)
    }

    /// Build a board over an in-memory store.
    pub fn from_store(data_file: &Path, store: TaskStore) -> Self {
        let mut board = MatrixBoard {
            data_file: data_file.to_path_buf(),
            store,
            matrix: TaskMatrix::new(),
            categories: Vec::new(),
            category_state: ListState::default(),
            status_message: String::new(),
        };
        board.refresh();
        board
    }

    /// Rebuild the matrix and keep the selection on the same category name
    /// when it still exists.
    fn refresh(&mut self) {
        let previous = self.selected_category().map(str::to_string);
        self.matrix.rebuild(&self.store);
        self.categories = self.matrix.categories().into_iter().map(String::from).collect();

        let index = previous
            .and_then(|name| self.categories.iter().position(|c| *c == name))
            .or(if self.categories.is_empty() { None } else { Some(0) });
        self.category_state.select(index);
    }

    /// Reload the data file from disk. Failures keep the current tasks and
    /// are shown in the status bar.
    pub fn reload(&mut self) {
        let mut store = TaskStore::new();
        let loaded = if self.data_file.exists() {
            store.load(&self.data_file)
        } else {
            Ok(())
        };
        match loaded {
            Ok(()) => {
                debug!(path = %self.data_file.display(), tasks = store.len(), "board reloaded");
                self.store = store;
                self.refresh();
                self.status_message = format!("Reloaded {} task(s)", self.store.len());
            }
            Err(e) => {
                warn!(error = %e, "board reload failed");
                self.status_message = format!("Reload failed: {e}");
            }
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.category_state
            .selected()
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
    }

    fn select_next(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        let i = match self.category_state.selected() {
            Some(i) if i + 1 < self.categories.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.category_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if self.categories.is_empty() {
            return;
        }
        let i = match self.category_state.selected() {
            Some(0) | None => self.categories.len() - 1,
            Some(i) => i - 1,
        };
        self.category_state.select(Some(i));
    }

    /// Apply one key press. Returns `true` when the board should close.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        self.status_message.clear();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Home => {
                if !self.categories.is_empty() {
                    self.category_state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.categories.is_empty() {
                    self.category_state.select(Some(self.categories.len() - 1));
                }
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code));
                }
            }
        }
        Ok(false)
    }

    fn render_categories(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .categories
            .iter()
            .map(|c| {
                let count: usize = self.matrix.buckets(c).map(|(_, tasks)| tasks.len()).sum();
                ListItem::new(format!("{c} ({count})"))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Categories"))
            .highlight_style(
                Style::default()
                    .bg(BOARD_BLUE)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.category_state);
    }

    fn render_tasks(&mut self, f: &mut Frame, area: Rect) {
        let Some(category) = self.selected_category() else {
            let empty = Paragraph::new("No tasks to display in matrix")
                .block(Block::default().borders(Borders::ALL).title("Tasks"))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        };

        let header = Row::new(["Pri", "ID", "Status", "Title"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(BOARD_BLUE).fg(Color::White))
        .height(1);

        let mut rows = Vec::new();
        for (priority, tasks) in self.matrix.buckets(category) {
            for (n, t) in tasks.iter().enumerate() {
                let pri = if n == 0 {
                    Cell::from(format!(" {priority} "))
                        .style(Style::default().bg(priority_color(priority)).fg(Color::White))
                } else {
                    Cell::from("")
                };
                rows.push(
                    Row::new(vec![
                        pri,
                        Cell::from(t.id().to_string()),
                        Cell::from(t.status().label()),
                        Cell::from(t.title().to_string()),
                    ])
                    .style(Style::default().fg(status_color(t.status()))),
                );
            }
        }

        let widths = [
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Min(10),
        ];
        let title = format!("Category: {category}");
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(table, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            format!(
                "Tasks: {} | Categories: {} | j/k move  r reload  q quit",
                self.matrix.total_task_count(),
                self.categories.len()
            )
        } else {
            self.status_message.clone()
        };
        let status = Paragraph::new(Line::from(vec![
            Span::styled(" TASK MATRIX ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::raw(text),
        ]))
        .style(Style::default().bg(BOARD_BLUE).fg(Color::White))
        .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole board into one frame.
    pub fn render(&mut self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(rows[0]);

        self.render_categories(f, panes[0]);
        self.render_tasks(f, panes[1]);
        self.render_status_bar(f, rows[1]);
    }

    /// Main event loop. Runs until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
