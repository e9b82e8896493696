use ratatui::Frame;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use rootcamp_core::SessionEffect;

use super::modal::ModalSession;
use super::styles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Guided,
    Catalog,
    Progress,
    Settings,
    Exit,
}

const ENTRIES: &[(MenuChoice, &str, &str)] = &[
    (
        MenuChoice::Guided,
        "Guided Learning",
        "Work through the course in order",
    ),
    (
        MenuChoice::Catalog,
        "Lesson Catalog",
        "Pick any lesson you like",
    ),
    (
        MenuChoice::Progress,
        "View Progress",
        "See what you have completed",
    ),
    (MenuChoice::Settings, "Settings", "Shell preferences"),
    (MenuChoice::Exit, "Exit", "Leave RootCamp"),
];

pub struct MainMenu {
    active: bool,
    selected: usize,
    choice: Option<MenuChoice>,
    list_state: ListState,
}

impl MainMenu {
    pub fn new() -> Self {
        Self {
            active: false,
            selected: 0,
            choice: None,
            list_state: ListState::default(),
        }
    }

    /// The entry picked before the menu closed; `None` means quit.
    pub fn take_choice(&mut self) -> Option<MenuChoice> {
        self.choice.take()
    }

    fn choose(&mut self, choice: MenuChoice) -> SessionEffect {
        self.choice = (choice != MenuChoice::Exit).then_some(choice);
        self.active = false;
        SessionEffect::Closed
    }
}

impl ModalSession for MainMenu {
    fn open(&mut self) {
        self.active = true;
        self.choice = None;
    }

    fn handle_event(&mut self, key: KeyEvent) -> SessionEffect {
        let total = ENTRIES.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = (self.selected + total - 1) % total;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % total;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(index) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1))
                    && index < total
                {
                    self.selected = index;
                }
            }
            KeyCode::Enter => {
                if let Some((choice, _, _)) = ENTRIES.get(self.selected) {
                    return self.choose(*choice);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => return self.choose(MenuChoice::Exit),
            _ => {}
        }
        SessionEffect::None
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn close(&mut self) {
        self.active = false;
    }

    fn render(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .margin(1)
        .areas(frame.area());

        let banner = Paragraph::new(vec![
            Line::from(Span::styled("ROOT CAMP", styles::TITLE)),
            Line::from(Span::styled(
                "Learn the shell one sandbox at a time",
                styles::DESCRIPTION,
            )),
        ])
        .block(styles::panel("Welcome"));
        frame.render_widget(banner, header);

        let items: Vec<ListItem> = ENTRIES
            .iter()
            .enumerate()
            .map(|(idx, (_, title, description))| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("{:2}. ", idx + 1), styles::ITEM_NUMBER),
                        Span::raw(*title),
                    ]),
                    Line::from(Span::styled(
                        format!("    {description}"),
                        styles::DESCRIPTION,
                    )),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(styles::panel("Main Menu"))
            .style(styles::DEFAULT_TEXT)
            .highlight_style(styles::HIGHLIGHT)
            .highlight_symbol("> ");
        self.list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, body, &mut self.list_state);

        frame.render_widget(
            Paragraph::new("↑/↓ j/k to move  •  Enter select  •  q quit")
                .style(styles::DESCRIPTION)
                .block(styles::panel("Keys")),
            footer,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_reports_selected_entry() {
        let mut menu = MainMenu::new();
        menu.open();
        menu.handle_event(key(KeyCode::Down));
        assert_eq!(menu.handle_event(key(KeyCode::Enter)), SessionEffect::Closed);
        assert_eq!(menu.take_choice(), Some(MenuChoice::Catalog));
        assert!(!menu.is_active());
    }

    #[test]
    fn digits_jump_and_wrap_around() {
        let mut menu = MainMenu::new();
        menu.open();
        menu.handle_event(key(KeyCode::Char('4')));
        menu.handle_event(key(KeyCode::Enter));
        assert_eq!(menu.take_choice(), Some(MenuChoice::Settings));

        menu.open();
        menu.handle_event(key(KeyCode::Char('1')));
        menu.handle_event(key(KeyCode::Up));
        menu.handle_event(key(KeyCode::Enter));
        assert_eq!(menu.take_choice(), None);
    }

    #[test]
    fn quit_leaves_without_choice() {
        let mut menu = MainMenu::new();
        menu.open();
        assert_eq!(menu.handle_event(key(KeyCode::Char('q'))), SessionEffect::Closed);
        assert_eq!(menu.take_choice(), None);
    }
}
