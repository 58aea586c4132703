//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;

/// Header and status bar background
pub const BOARD_BLUE: Color = Color::Rgb(30, 60, 110);
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
pub const GOLD: Color = Color::Rgb(255, 215, 0);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Foreground used for a task row.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::White,
        Status::InProgress => GOLD,
        Status::Completed => Color::Green,
        Status::Cancelled => Color::DarkGray,
    }
}

/// Background for the priority label column; hotter for higher priorities.
pub fn priority_color(priority: u8) -> Color {
    match priority {
        0..=3 => DARK_GREEN,
        4..=7 => Color::Rgb(120, 90, 0),
        _ => DARK_RED,
    }
}
