use ratatui::Frame;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Margin};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use rootcamp_core::SessionEffect;
use rootcamp_progress_store::{Settings, SettingsStore};
use tracing::{info, warn};

use super::modal::ModalSession;
use super::styles;

pub struct SettingsScreen {
    store: Option<SettingsStore>,
    settings: Settings,
    message: Option<String>,
    active: bool,
}

impl SettingsScreen {
    pub fn new(store: Option<SettingsStore>) -> Self {
        Self {
            store,
            settings: Settings::default(),
            message: None,
            active: false,
        }
    }

    fn toggle_basic_bash(&mut self) {
        let Some(store) = self.store.as_ref() else {
            self.message = Some("Settings cannot be saved: data directory unavailable".to_string());
            return;
        };

        let enabled = !self.settings.use_basic_bash;
        match store.set_use_basic_bash(enabled) {
            Ok(settings) => {
                info!(use_basic_bash = enabled, "settings updated");
                self.settings = settings;
                self.message = Some("Saved.".to_string());
            }
            Err(err) => {
                warn!(error = %err, "failed to save settings");
                self.message = Some(format!("Failed to save settings: {err}"));
            }
        }
    }
}

impl ModalSession for SettingsScreen {
    fn open(&mut self) {
        self.message = None;
        self.settings = match self.store.as_ref().map(SettingsStore::get_settings) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                warn!(error = %err, "failed to read settings");
                Settings::default()
            }
            None => Settings::default(),
        };
        self.active = true;
    }

    fn handle_event(&mut self, key: KeyEvent) -> SessionEffect {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_basic_bash();
                SessionEffect::None
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close();
                SessionEffect::Closed
            }
            _ => SessionEffect::None,
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn close(&mut self) {
        self.active = false;
    }

    fn render(&mut self, frame: &mut Frame) {
        let [body, footer] = Layout::vertical([Constraint::Min(5), Constraint::Length(3)])
            .areas(frame.area().inner(Margin::new(1, 1)));

        let checkbox = if self.settings.use_basic_bash {
            "[x]"
        } else {
            "[ ]"
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("{checkbox} "), styles::ITEM_NUMBER),
                Span::raw("Use basic bash in labs"),
            ]),
            Line::from(Span::styled(
                "    Start labs in plain bash instead of your login shell.",
                styles::DESCRIPTION,
            )),
        ];
        if let Some(message) = &self.message {
            lines.push(Line::default());
            lines.push(Line::from(message.clone()));
        }

        frame.render_widget(Paragraph::new(lines).block(styles::panel("Settings")), body);
        frame.render_widget(
            Paragraph::new("Enter/Space toggle  •  Esc back")
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

    #[test]
    fn toggle_persists_choice() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path().to_path_buf()).unwrap();
        let mut screen = SettingsScreen::new(Some(store.clone()));
        screen.open();
        assert!(!screen.settings.use_basic_bash);

        screen.handle_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(screen.settings.use_basic_bash);
        assert!(store.get_settings().unwrap().use_basic_bash);

        assert_eq!(
            screen.handle_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            SessionEffect::Closed
        );
    }

    #[test]
    fn toggle_without_store_reports_message() {
        let mut screen = SettingsScreen::new(None);
        screen.open();
        screen.handle_event(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(!screen.settings.use_basic_bash);
        assert!(screen.message.is_some());
    }
}
