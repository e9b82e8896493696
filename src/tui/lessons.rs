use ratatui::Frame;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};
use rootcamp_core::content::next_unlocked;
use rootcamp_core::{
    LessonSession, LessonStatus, OverviewMode, SUCCESS_MESSAGE, SessionEffect, SessionEvent,
    SessionState, render_progress_bar,
};
use rootcamp_lab::Lesson;

use super::modal::ModalSession;
use super::styles;
use crate::startup::ShellChoice;

/// Lesson overview, detail, answer entry, and success views over one
/// [`LessonSession`].
pub struct LessonScreen {
    session: LessonSession,
    shell: ShellChoice,
    selected: usize,
    scroll: u16,
    list_state: ListState,
}

impl LessonScreen {
    pub fn new(session: LessonSession, shell: ShellChoice) -> Self {
        Self {
            session,
            shell,
            selected: 0,
            scroll: 0,
            list_state: ListState::default(),
        }
    }

    fn overview_key(&mut self, key: KeyEvent) -> SessionEffect {
        let items = self.session.overview_items();
        let total = items.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if total > 0 => {
                self.selected = (self.selected + total - 1) % total;
            }
            KeyCode::Down | KeyCode::Char('j') if total > 0 => {
                self.selected = (self.selected + 1) % total;
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = total.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(item) = items.get(self.selected) {
                    self.scroll = 0;
                    return self
                        .session
                        .handle(SessionEvent::Select(item.lesson.id.clone()));
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => return self.session.handle(SessionEvent::Cancel),
            _ => {}
        }
        SessionEffect::None
    }

    fn detail_key(&mut self, key: KeyEvent) -> SessionEffect {
        match key.code {
            KeyCode::Char('s') => self.session.handle(SessionEvent::StartLab),
            KeyCode::Char('c') => self.session.handle(SessionEvent::EnterCode),
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                SessionEffect::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                SessionEffect::None
            }
            KeyCode::Esc | KeyCode::Char('q') => self.session.handle(SessionEvent::Cancel),
            _ => SessionEffect::None,
        }
    }

    fn code_input_key(&mut self, key: KeyEvent) -> SessionEffect {
        match key.code {
            KeyCode::Enter => self.session.handle(SessionEvent::Submit),
            KeyCode::Esc => self.session.handle(SessionEvent::Cancel),
            KeyCode::Backspace => self.session.handle(SessionEvent::Backspace),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.session.handle(SessionEvent::Input(c))
            }
            _ => SessionEffect::None,
        }
    }

    fn render_overview(&mut self, frame: &mut Frame, area: Rect) {
        let items = self.session.overview_items();
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .areas(area);

        let (completed, total) = self.session.overview_progress();
        let percentage = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        let title = match self.session.mode() {
            OverviewMode::Guided => self.session.content().course().course.title.clone(),
            OverviewMode::Catalog => "Lesson Catalog".to_string(),
        };
        let summary = Paragraph::new(vec![
            Line::from(Span::styled(title, styles::TITLE)),
            Line::from(format!(
                "{} {completed}/{total} complete",
                render_progress_bar(percentage, 30)
            )),
        ])
        .block(styles::panel("Progress"));
        frame.render_widget(summary, header);

        let list_items: Vec<ListItem> = items
            .iter()
            .map(|item| {
                let (mark, style) = match item.status {
                    LessonStatus::Complete => ("✓", styles::SUCCESS),
                    LessonStatus::Unlocked => ("•", styles::DEFAULT_TEXT),
                    LessonStatus::Locked => ("🔒", styles::LOCKED),
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("{mark} "), style),
                        Span::styled(format!("{:2}. ", item.sequence), styles::ITEM_NUMBER),
                        Span::styled(format!("[{}] ", item.lesson.code), styles::SECTION),
                        Span::styled(item.lesson.title.clone(), style),
                    ]),
                    Line::from(Span::styled(
                        format!("      {} · {}", item.lesson.level, item.lesson.module),
                        styles::DESCRIPTION,
                    )),
                ])
            })
            .collect();

        let list = List::new(list_items)
            .block(styles::panel("Lessons"))
            .highlight_style(styles::HIGHLIGHT)
            .highlight_symbol("> ")
            .scroll_padding(1);
        self.list_state
            .select((!items.is_empty()).then(|| self.selected.min(items.len() - 1)));
        frame.render_stateful_widget(list, body, &mut self.list_state);

        render_keys(frame, footer, "↑/↓ move  •  Enter open  •  Esc back");
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, lesson: &Lesson) {
        let [body, feedback, footer] = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .areas(area);

        let mut lines = lesson_about_lines(lesson, |text| self.session.display_text(text));
        if !lesson.hints.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Hints", styles::SECTION)));
            for hint in &lesson.hints {
                lines.push(Line::from(format!("  • {}", self.session.display_text(hint))));
            }
        }
        if let Some(record) = self.session.lesson_progress(&lesson.id)
            && record.attempts > 0
        {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Attempts so far: {}", record.attempts),
                styles::DESCRIPTION,
            )));
        }

        let title = format!("[{}] {}", lesson.code, lesson.title);
        frame.render_widget(
            Paragraph::new(lines)
                .block(styles::panel(&title))
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            body,
        );
        render_feedback(frame, feedback, self.session.feedback());

        let keys = if lesson.skip_sandbox {
            "s / c enter answer  •  ↑/↓ scroll  •  Esc back"
        } else {
            "s start lab  •  c enter code  •  ↑/↓ scroll  •  Esc back"
        };
        render_keys(frame, footer, keys);
    }

    fn render_code_input(&self, frame: &mut Frame, area: Rect, lesson: &Lesson) {
        let [instructions, input, feedback, footer] = Layout::vertical([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .areas(area);

        let title = format!("[{}] {}", lesson.code, lesson.title);
        frame.render_widget(
            Paragraph::new(self.session.display_text(&lesson.instructions))
                .block(styles::panel(&title))
                .wrap(Wrap { trim: false }),
            instructions,
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("> ", styles::ITEM_NUMBER),
                Span::raw(self.session.input().to_string()),
                Span::styled("█", styles::DESCRIPTION),
            ]))
            .block(styles::panel("Your answer")),
            input,
        );
        render_feedback(frame, feedback, self.session.feedback());
        render_keys(frame, footer, "Enter submit  •  Esc back to lesson");
    }

    fn render_success(&self, frame: &mut Frame, area: Rect, lesson: &Lesson) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(area);
        let message = self.session.feedback().unwrap_or_default().to_string();
        frame.render_widget(
            Paragraph::new(vec![
                Line::default(),
                Line::from(Span::styled(message, styles::SUCCESS)),
                Line::default(),
                Line::from(format!("You finished \"{}\".", lesson.title)),
            ])
            .block(styles::panel("Lesson complete"))
            .wrap(Wrap { trim: true }),
            body,
        );
        render_keys(frame, footer, "Enter continue");
    }
}

impl ModalSession for LessonScreen {
    fn open(&mut self) {
        self.session.open(self.shell.program());
        let items = self.session.overview_items();
        self.selected = next_unlocked(&items)
            .and_then(|next| {
                items
                    .iter()
                    .position(|item| item.lesson.id == next.lesson.id)
            })
            .unwrap_or(0);
        self.scroll = 0;
    }

    fn handle_event(&mut self, key: KeyEvent) -> SessionEffect {
        match self.session.state() {
            SessionState::Overview => self.overview_key(key),
            SessionState::Detail => self.detail_key(key),
            SessionState::CodeInput => self.code_input_key(key),
            SessionState::Success => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'q') => {
                    self.session.handle(SessionEvent::Acknowledge)
                }
                _ => SessionEffect::None,
            },
            SessionState::LabRunning => SessionEffect::None,
        }
    }

    fn is_active(&self) -> bool {
        self.session.is_active()
    }

    fn close(&mut self) {
        self.session.close();
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area().inner(Margin::new(1, 1));
        let lesson = self.session.current_lesson().cloned();
        match (self.session.state(), lesson) {
            (SessionState::Detail | SessionState::LabRunning, Some(lesson)) => {
                self.render_detail(frame, area, &lesson);
            }
            (SessionState::CodeInput, Some(lesson)) => {
                self.render_code_input(frame, area, &lesson);
            }
            (SessionState::Success, Some(lesson)) => self.render_success(frame, area, &lesson),
            _ => self.render_overview(frame, area),
        }
    }

    fn shell_exited(&mut self, error: Option<String>) {
        self.session.handle(SessionEvent::ShellExited { error });
    }
}

/// The "about" sections of a lesson followed by its instructions.
///
/// `render` fills placeholders; empty sections are left out.
pub fn lesson_about_lines(lesson: &Lesson, render: impl Fn(&str) -> String) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let about = &lesson.about;

    let mut section = |heading: String, body: &str| {
        if body.trim().is_empty() {
            return;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(heading, styles::SECTION)));
        lines.extend(render(body).lines().map(|line| Line::from(line.to_string())));
    };

    let subject = if lesson.command.is_empty() {
        lesson.title.as_str()
    } else {
        lesson.command.as_str()
    };
    section(format!("What is {subject}?"), &about.what);
    section("Example".to_string(), &about.example);
    section("History".to_string(), &about.history);
    let uses = about
        .common_uses
        .iter()
        .map(|entry| format!("• {entry}"))
        .collect::<Vec<_>>()
        .join("\n");
    section("Common Uses".to_string(), &uses);
    section("Instructions".to_string(), &lesson.instructions);

    lines
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: Option<&str>) {
    let Some(message) = feedback else {
        return;
    };
    let style: Style = if message == SUCCESS_MESSAGE {
        styles::SUCCESS
    } else {
        styles::ERROR
    };
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), style)).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_keys(frame: &mut Frame, area: Rect, keys: &str) {
    frame.render_widget(
        Paragraph::new(keys.to_string())
            .style(styles::DESCRIPTION)
            .block(styles::panel("Keys")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootcamp_lab::LessonAbout;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn about_sections_follow_fixed_order_and_skip_empty() {
        let lesson = Lesson {
            id: "pwd".to_string(),
            command: "pwd".to_string(),
            title: "Where am I?".to_string(),
            about: LessonAbout {
                what: "Prints the working directory.".to_string(),
                history: String::new(),
                example: "$ pwd".to_string(),
                common_uses: vec!["Checking location".to_string()],
            },
            instructions: "Open {SANDBOX}".to_string(),
            ..Lesson::default()
        };

        let lines = lesson_about_lines(&lesson, |text| text.replace("{SANDBOX}", "/tmp/x"));

        assert_eq!(
            plain(&lines),
            vec![
                "What is pwd?",
                "Prints the working directory.",
                "",
                "Example",
                "$ pwd",
                "",
                "Common Uses",
                "• Checking location",
                "",
                "Instructions",
                "Open /tmp/x",
            ]
        );
    }
}
