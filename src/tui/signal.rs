use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use rootcamp_lab::{ActiveSandboxRegistry, ScratchRoot};
use tracing::{error, info};

#[cfg(unix)]
use anyhow::Context;
#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Set while a lab shell owns the terminal.
///
/// Ctrl+C inside the lab reaches this process too (same foreground process
/// group); it belongs to the shell and must not end the session.
#[derive(Debug, Clone, Default)]
pub struct HandoffFlag(Arc<AtomicBool>);

impl HandoffFlag {
    pub fn begin(&self) -> HandoffScope<'_> {
        self.0.store(true, Ordering::SeqCst);
        HandoffScope(self)
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct HandoffScope<'a>(&'a HandoffFlag);

impl Drop for HandoffScope<'_> {
    fn drop(&mut self) {
        self.0.0.store(false, Ordering::SeqCst);
    }
}

/// Reap whatever sandbox the registry still holds. Shared by the signal
/// thread and normal shutdown; the registry hands the path out only once.
pub fn reap_registered(registry: &ActiveSandboxRegistry, scratch: &ScratchRoot) {
    if let Some(path) = registry.take() {
        match scratch.cleanup(&path) {
            Ok(()) => info!(path = %path.display(), "reaped sandbox on shutdown"),
            Err(err) => error!(path = %path.display(), error = %err, "failed to reap sandbox"),
        }
    }
}

/// Reaps the active sandbox and restores the terminal when the process is
/// interrupted, terminated, or loses its terminal.
pub struct SignalCleanupGuard {
    handoff: HandoffFlag,
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
    #[cfg(unix)]
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SignalCleanupGuard {
    #[cfg(unix)]
    pub fn new(registry: ActiveSandboxRegistry, scratch: ScratchRoot) -> Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
            .context("failed to register signal handlers")?;
        let handle = signals.handle();
        let handoff = HandoffFlag::default();
        let thread_handoff = handoff.clone();

        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                if signal == SIGINT && thread_handoff.is_active() {
                    continue;
                }
                info!(signal, "shutting down on signal");
                reap_registered(&registry, &scratch);
                super::terminal::restore_terminal();
                std::process::exit(130);
            }
        });

        Ok(Self {
            handoff,
            handle,
            thread: Some(thread),
        })
    }

    #[cfg(not(unix))]
    pub fn new(_registry: ActiveSandboxRegistry, _scratch: ScratchRoot) -> Result<Self> {
        Ok(Self {
            handoff: HandoffFlag::default(),
        })
    }

    pub fn handoff(&self) -> &HandoffFlag {
        &self.handoff
    }
}

impl Drop for SignalCleanupGuard {
    #[cfg(unix)]
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {}
}
