//! RootCamp: learn shell commands in disposable sandboxes.

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rootcamp_config::DebugConfig;
use rootcamp_config::constants::defaults;
use tracing_subscriber::EnvFilter;

mod cli;
mod startup;
mod tui;

use cli::{Cli, Commands};
use startup::StartupContext;

fn main() -> Result<()> {
    let args = Cli::parse();
    let interactive = args.command.is_none();

    let manager = startup::load_config(&args)?;
    if let Err(err) = initialize_tracing(&manager.config().debug, interactive) {
        eprintln!("warning: tracing disabled: {err:#}");
    }
    let startup = StartupContext::from_config(&manager)?;

    match &args.command {
        None => tui::run(&startup)?,
        Some(Commands::Lessons { level, module, tag }) => cli::handle_lessons_command(
            &startup,
            level.as_deref(),
            module.as_deref(),
            tag.as_deref(),
        )?,
        Some(Commands::Progress) => cli::handle_progress_command(&startup)?,
        Some(Commands::Gc) => cli::handle_gc_command(&startup)?,
        Some(Commands::Reset) => cli::handle_reset_command(&startup)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the `[debug]` section decides. The TUI owns the
/// terminal, so interactive runs log to a file and subcommands to stderr.
fn initialize_tracing(debug: &DebugConfig, interactive: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug.enable_tracing {
        EnvFilter::new(debug.filter_directive())
    } else {
        return Ok(());
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if interactive {
        let dir = debug.debug_log_path();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = dir.join(defaults::LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    } else {
        builder
            .with_writer(io::stderr)
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    }

    let trace_level = &debug.trace_level;
    tracing::info!(
        level = %trace_level,
        interactive,
        "tracing initialized"
    );
    Ok(())
}
