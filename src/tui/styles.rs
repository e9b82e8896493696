//! Shared ratatui styles.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType};

pub const TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

pub const ITEM_NUMBER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

pub const DESCRIPTION: Style = Style::new().fg(Color::DarkGray);

pub const DEFAULT_TEXT: Style = Style::new().fg(Color::White);

pub const HIGHLIGHT: Style = Style::new()
    .fg(Color::Green)
    .add_modifier(Modifier::BOLD.union(Modifier::REVERSED));

pub const SUCCESS: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

pub const ERROR: Style = Style::new().fg(Color::Red);

pub const LOCKED: Style = Style::new().fg(Color::DarkGray);

pub const SECTION: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

pub fn panel(title: &str) -> Block<'_> {
    Block::bordered()
        .title(title)
        .title_style(TITLE)
        .border_type(BorderType::Rounded)
}
