//! Interactive terminal UI.
//!
//! Every screen implements [`ModalSession`]. The dispatcher owns the terminal,
//! routes key presses to the open screen, returns to the main menu when a
//! screen closes, and runs lab shells on a screen's behalf.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result, bail};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use rootcamp_core::{LessonSession, OverviewMode, SessionEffect};
use tracing::debug;

use crate::startup::StartupContext;

mod lessons;
mod menu;
mod modal;
mod progress;
mod settings;
mod shell;
mod signal;
mod styles;
mod terminal;

use lessons::LessonScreen;
use menu::{MainMenu, MenuChoice};
use modal::ModalSession;
use progress::ProgressScreen;
use settings::SettingsScreen;
use signal::{HandoffFlag, SignalCleanupGuard, reap_registered};
use terminal::{TerminalModeGuard, TuiTerminal, suspend_terminal_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Guided,
    Catalog,
    Progress,
    Settings,
}

struct App {
    menu: MainMenu,
    guided: LessonScreen,
    catalog: LessonScreen,
    progress: ProgressScreen,
    settings: SettingsScreen,
    current: Screen,
}

impl App {
    fn new(ctx: &StartupContext) -> Self {
        let lesson_screen = |mode: OverviewMode| {
            LessonScreen::new(
                LessonSession::new(
                    mode,
                    ctx.content.clone(),
                    ctx.progress.clone(),
                    ctx.materializer(),
                ),
                ctx.shell.clone(),
            )
        };

        Self {
            menu: MainMenu::new(),
            guided: lesson_screen(OverviewMode::Guided),
            catalog: lesson_screen(OverviewMode::Catalog),
            progress: ProgressScreen::new(ctx.content.clone(), ctx.progress.clone()),
            settings: SettingsScreen::new(ctx.settings.clone()),
            current: Screen::Menu,
        }
    }

    fn screen_mut(&mut self, screen: Screen) -> &mut dyn ModalSession {
        match screen {
            Screen::Menu => &mut self.menu,
            Screen::Guided => &mut self.guided,
            Screen::Catalog => &mut self.catalog,
            Screen::Progress => &mut self.progress,
            Screen::Settings => &mut self.settings,
        }
    }

    fn switch_to(&mut self, screen: Screen) {
        debug!(from = ?self.current, to = ?screen, "switching screen");
        self.current = screen;
        self.screen_mut(screen).open();
    }

    fn run(&mut self, terminal: &mut TuiTerminal, handoff: &HandoffFlag) -> Result<()> {
        self.switch_to(Screen::Menu);

        loop {
            let current = self.current;
            terminal
                .draw(|frame| self.screen_mut(current).render(frame))
                .context("Failed to draw RootCamp UI")?;

            let Event::Key(key) = event::read().context("Failed to read terminal input")? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.screen_mut(current).close();
                return Ok(());
            }

            let effect = self.screen_mut(current).handle_event(key);
            if !self.dispatch(effect, terminal, handoff)? {
                return Ok(());
            }
        }
    }

    /// Act on a screen's effect. `false` ends the program.
    fn dispatch(
        &mut self,
        effect: SessionEffect,
        terminal: &mut TuiTerminal,
        handoff: &HandoffFlag,
    ) -> Result<bool> {
        let current = self.current;
        match effect {
            SessionEffect::None => {}
            SessionEffect::LaunchShell(request) => {
                let outcome =
                    suspend_terminal_for(terminal, || shell::launch(&request, handoff))?;
                let error = outcome.err().map(|err| format!("{err:#}"));
                self.screen_mut(current).shell_exited(error);
            }
            SessionEffect::Closed if current == Screen::Menu => {
                let next = match self.menu.take_choice() {
                    Some(MenuChoice::Guided) => Screen::Guided,
                    Some(MenuChoice::Catalog) => Screen::Catalog,
                    Some(MenuChoice::Progress) => Screen::Progress,
                    Some(MenuChoice::Settings) => Screen::Settings,
                    Some(MenuChoice::Exit) | None => return Ok(false),
                };
                self.switch_to(next);
                return Ok(true);
            }
            SessionEffect::Closed => {}
        }

        if current != Screen::Menu && !self.screen_mut(current).is_active() {
            self.switch_to(Screen::Menu);
        }
        Ok(true)
    }

    fn shutdown(&mut self) {
        self.guided.close();
        self.catalog.close();
    }
}

/// Run the interactive UI until the learner exits.
pub fn run(ctx: &StartupContext) -> Result<()> {
    if !io::stderr().is_terminal() {
        bail!("RootCamp needs an interactive terminal; try `rootcamp lessons` instead");
    }

    let signals = SignalCleanupGuard::new(ctx.registry.clone(), ctx.scratch.clone())?;
    let mut app = App::new(ctx);

    let mut stderr = io::stderr();
    let mut guard = TerminalModeGuard::new();
    guard.enable_raw_mode()?;
    guard.enter_alternate_screen(&mut stderr)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stderr))
        .context("Failed to initialize Ratatui terminal")?;
    guard.hide_cursor(&mut terminal)?;

    let result = app.run(&mut terminal, signals.handoff());

    app.shutdown();
    reap_registered(&ctx.registry, &ctx.scratch);
    guard.restore_with_terminal(&mut terminal)?;
    result
}
