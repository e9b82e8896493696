//! The lesson flow: pick a lesson, work in a sandboxed shell, submit an answer.

mod controller;
mod shell;

pub use controller::{
    LessonSession, OverviewMode, RETRY_MESSAGE, SUCCESS_MESSAGE, SessionEffect, SessionEvent,
    SessionState,
};
pub use shell::{ShellRequest, shell_quote};
