use ratatui::Frame;
use ratatui::crossterm::event::KeyEvent;
use rootcamp_core::SessionEffect;

/// A full-screen view the dispatcher can route keys to.
///
/// A screen returns [`SessionEffect::Closed`] when it hands control back;
/// [`SessionEffect::LaunchShell`] asks the dispatcher to run a lab shell and
/// report back through [`ModalSession::shell_exited`].
pub trait ModalSession {
    fn open(&mut self);

    fn handle_event(&mut self, key: KeyEvent) -> SessionEffect;

    fn is_active(&self) -> bool;

    /// Leave the screen, releasing anything it holds.
    fn close(&mut self);

    fn render(&mut self, frame: &mut Frame);

    fn shell_exited(&mut self, _error: Option<String>) {}
}
