use std::sync::Arc;

use ratatui::Frame;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Margin};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use rootcamp_core::stats::ProgressStats;
use rootcamp_core::{
    ContentRepository, OverallProgress, SessionEffect, calculate_progress, render_progress_bar,
};
use rootcamp_progress_store::ProgressStore;
use tracing::warn;

use super::modal::ModalSession;
use super::styles;

const BAR_WIDTH: usize = 24;

/// Read-only completion statistics.
pub struct ProgressScreen {
    content: Arc<ContentRepository>,
    progress: Arc<dyn ProgressStore>,
    stats: OverallProgress,
    active: bool,
}

impl ProgressScreen {
    pub fn new(content: Arc<ContentRepository>, progress: Arc<dyn ProgressStore>) -> Self {
        Self {
            content,
            progress,
            stats: OverallProgress::default(),
            active: false,
        }
    }
}

fn stat_line(label: &str, stats: &ProgressStats) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {label:<18} ")),
        Span::styled(
            render_progress_bar(stats.percentage, BAR_WIDTH),
            styles::SUCCESS,
        ),
        Span::raw(format!(
            " {:>5.1}%  {}/{}",
            stats.percentage, stats.completed, stats.total
        )),
    ])
}

impl ModalSession for ProgressScreen {
    fn open(&mut self) {
        let records = match self.progress.get_all_progress() {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "failed to read progress");
                Default::default()
            }
        };
        self.stats = calculate_progress(self.content.lessons(), &records);
        self.active = true;
    }

    fn handle_event(&mut self, key: KeyEvent) -> SessionEffect {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
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

        let mut lines = vec![
            Line::from(Span::styled("Overall", styles::SECTION)),
            stat_line("All lessons", &self.stats.overall),
        ];
        if !self.stats.by_level.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("By level", styles::SECTION)));
            lines.extend(
                self.stats
                    .by_level
                    .iter()
                    .map(|entry| stat_line(&entry.level, &entry.stats)),
            );
        }
        if !self.stats.by_module.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("By module", styles::SECTION)));
            lines.extend(
                self.stats
                    .by_module
                    .iter()
                    .map(|entry| stat_line(&entry.module, &entry.stats)),
            );
        }

        frame.render_widget(
            Paragraph::new(lines).block(styles::panel("Your Progress")),
            body,
        );
        frame.render_widget(
            Paragraph::new("Enter / Esc back")
                .style(styles::DESCRIPTION)
                .block(styles::panel("Keys")),
            footer,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use rootcamp_progress_store::MemoryProgressStore;

    #[test]
    fn open_computes_stats_and_renders() {
        let content = Arc::new(ContentRepository::embedded().unwrap());
        let store = Arc::new(MemoryProgressStore::new());
        let first = content.lessons().next().unwrap().id.clone();
        store.mark_complete(&first).unwrap();

        let mut screen = ProgressScreen::new(content.clone(), store);
        screen.open();
        assert_eq!(screen.stats.overall.completed, 1);
        assert_eq!(screen.stats.overall.total, content.len());

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| screen.render(frame)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Overall"));
        assert!(rendered.contains("By module"));
    }
}
