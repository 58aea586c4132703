//! Matrix board entry point and terminal setup.

use std::{io, path::Path};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::error::Result;
use crate::tui::app::MatrixBoard;

/// Initialise the terminal and run the matrix board on `data_file`.
pub fn run_board(data_file: &Path) -> Result<()> {
    // Load before touching the terminal so a bad file reports normally.
    let mut board = MatrixBoard::new(data_file)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = board.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
