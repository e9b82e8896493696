//! Non-interactive subcommands.

use std::io::{self, IsTerminal};

use anstyle::{AnsiColor, Style};
use anyhow::{Context, Result};
use rootcamp_core::{calculate_progress, render_progress_bar};
use rootcamp_lab::Lesson;
use tracing::info;

use crate::startup::StartupContext;

mod args;

pub use args::{Cli, Commands};

const BAR_WIDTH: usize = 30;

struct Palette {
    heading: Style,
    done: Style,
    muted: Style,
}

impl Palette {
    fn detect() -> Self {
        if io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
            Self {
                heading: Style::new().bold(),
                done: AnsiColor::Green.on_default(),
                muted: AnsiColor::BrightBlack.on_default(),
            }
        } else {
            Self {
                heading: Style::new(),
                done: Style::new(),
                muted: Style::new(),
            }
        }
    }
}

pub fn handle_lessons_command(
    ctx: &StartupContext,
    level: Option<&str>,
    module: Option<&str>,
    tag: Option<&str>,
) -> Result<()> {
    let progress = ctx
        .progress
        .get_all_progress()
        .context("Failed to read progress")?;
    let palette = Palette::detect();

    let lessons: Vec<&Lesson> = ctx
        .content
        .lessons()
        .filter(|lesson| level.is_none_or(|level| lesson.level == level))
        .filter(|lesson| module.is_none_or(|module| lesson.module == module))
        .filter(|lesson| tag.is_none_or(|tag| lesson.tags.iter().any(|t| t == tag)))
        .collect();

    if lessons.is_empty() {
        println!("No lessons match the given filters.");
        return Ok(());
    }

    println!(
        "{}{:<3} {:<8} {:<20} {:<13} {}{:#}",
        palette.heading, "", "CODE", "ID", "LEVEL", "TITLE", palette.heading
    );
    for lesson in lessons {
        let completed = progress
            .get(&lesson.id)
            .is_some_and(|record| record.completed);
        let mark = if completed {
            format!("{}✓{:#}", palette.done, palette.done)
        } else {
            " ".to_string()
        };
        println!(
            "{mark}   {:<8} {:<20} {}{:<13}{:#} {}",
            lesson.code, lesson.id, palette.muted, lesson.level, palette.muted, lesson.title
        );
    }
    Ok(())
}

pub fn handle_progress_command(ctx: &StartupContext) -> Result<()> {
    let progress = ctx
        .progress
        .get_all_progress()
        .context("Failed to read progress")?;
    let stats = calculate_progress(ctx.content.lessons(), &progress);
    let palette = Palette::detect();

    println!("{}Overall{:#}", palette.heading, palette.heading);
    println!(
        "  {} {:>5.1}%  ({}/{})",
        render_progress_bar(stats.overall.percentage, BAR_WIDTH),
        stats.overall.percentage,
        stats.overall.completed,
        stats.overall.total
    );

    if !stats.by_level.is_empty() {
        println!();
        println!("{}By level{:#}", palette.heading, palette.heading);
        for entry in &stats.by_level {
            println!(
                "  {:<14} {} {:>3}/{}",
                entry.level,
                render_progress_bar(entry.stats.percentage, BAR_WIDTH / 2),
                entry.stats.completed,
                entry.stats.total
            );
        }
    }

    if !stats.by_module.is_empty() {
        println!();
        println!("{}By module{:#}", palette.heading, palette.heading);
        for entry in &stats.by_module {
            println!(
                "  {:<18} {} {:>3}/{}",
                entry.module,
                render_progress_bar(entry.stats.percentage, BAR_WIDTH / 2),
                entry.stats.completed,
                entry.stats.total
            );
        }
    }
    Ok(())
}

pub fn handle_gc_command(ctx: &StartupContext) -> Result<()> {
    let reaped = ctx.scratch.collect_orphans().with_context(|| {
        format!(
            "Failed to scan scratch root {}",
            ctx.scratch.root().display()
        )
    })?;

    for path in &reaped {
        println!("removed {}", path.display());
    }
    println!(
        "Removed {} sandbox{} from {}",
        reaped.len(),
        if reaped.len() == 1 { "" } else { "es" },
        ctx.scratch.root().display()
    );
    Ok(())
}

pub fn handle_reset_command(ctx: &StartupContext) -> Result<()> {
    ctx.progress.reset().context("Failed to reset progress")?;
    info!(data_dir = %ctx.data_dir.display(), "progress reset");
    println!("Progress cleared.");
    Ok(())
}
