use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::cursor::{MoveToColumn, SetCursorStyle, Show};
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode, is_raw_mode_enabled,
};
use tracing::debug;

pub type TuiTerminal = Terminal<CrosstermBackend<io::Stderr>>;

/// Owns raw mode and the alternate screen; whatever was switched on is
/// switched off again when the guard drops, including on error paths.
pub struct TerminalModeGuard {
    raw_mode_enabled: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
}

impl TerminalModeGuard {
    pub fn new() -> Self {
        Self {
            raw_mode_enabled: false,
            alternate_screen: false,
            cursor_hidden: false,
        }
    }

    pub fn enable_raw_mode(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        self.raw_mode_enabled = true;
        Ok(())
    }

    pub fn enter_alternate_screen(&mut self, stderr: &mut io::Stderr) -> Result<()> {
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        self.alternate_screen = true;
        Ok(())
    }

    pub fn hide_cursor(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        terminal.hide_cursor().context("Failed to hide cursor")?;
        self.cursor_hidden = true;
        Ok(())
    }

    pub fn restore_with_terminal(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        drain_pending_events();

        let _ = execute!(io::stderr(), MoveToColumn(0), Clear(ClearType::CurrentLine));

        // Leave the alternate screen first, then drop raw mode.
        if self.alternate_screen {
            execute!(terminal.backend_mut(), LeaveAlternateScreen)
                .context("Failed to leave alternate screen")?;
            self.alternate_screen = false;
        }

        if self.raw_mode_enabled {
            disable_raw_mode().context("Failed to disable raw mode")?;
            self.raw_mode_enabled = false;
        }

        if self.cursor_hidden {
            terminal.show_cursor().context("Failed to show cursor")?;
            self.cursor_hidden = false;
        }

        let _ = execute!(terminal.backend_mut(), SetCursorStyle::DefaultUserShape);
        terminal.backend_mut().flush().ok();
        io::stderr().flush().ok();
        Ok(())
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        drain_pending_events();

        let mut stderr = io::stderr();
        let _ = execute!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine));

        if self.alternate_screen {
            let _ = execute!(stderr, LeaveAlternateScreen);
            self.alternate_screen = false;
        }

        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
            self.raw_mode_enabled = false;
        }

        if self.cursor_hidden {
            let _ = execute!(stderr, SetCursorStyle::DefaultUserShape, Show);
            self.cursor_hidden = false;
        }

        let _ = stderr.flush();
    }
}

/// Best-effort terminal reset for the signal path, where the guard owned by
/// the main thread never gets to drop.
pub fn restore_terminal() {
    let mut stderr = io::stderr();
    let _ = execute!(stderr, LeaveAlternateScreen, Show);
    let _ = disable_raw_mode();
    let _ = stderr.flush();
}

/// Hand the terminal to `f`, then take it back.
///
/// Leaves the alternate screen, discards buffered input so the child does not
/// receive it, and disables raw mode. Afterwards raw mode and the alternate
/// screen come back and the screen is cleared so the next draw starts clean.
pub fn suspend_terminal_for<T>(terminal: &mut TuiTerminal, f: impl FnOnce() -> T) -> Result<T> {
    let was_raw_mode = match is_raw_mode_enabled() {
        Ok(enabled) => enabled,
        Err(error) => {
            debug!(%error, "failed to query raw mode status; assuming non-raw terminal state");
            false
        }
    };

    if was_raw_mode {
        execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)
            .context("Failed to leave alternate screen")?;
        drain_pending_events();
        disable_raw_mode().context("Failed to disable raw mode")?;
    }

    let result = f();

    if was_raw_mode {
        enable_raw_mode().context("Failed to re-enable raw mode")?;
        execute!(
            terminal.backend_mut(),
            EnterAlternateScreen,
            Clear(ClearType::All)
        )
        .context("Failed to re-enter alternate screen")?;
        terminal.clear().context("Failed to reset terminal buffer")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
    }

    Ok(result)
}

fn drain_pending_events() {
    while let Ok(true) = event::poll(Duration::from_millis(0)) {
        let _ = event::read();
    }
}
