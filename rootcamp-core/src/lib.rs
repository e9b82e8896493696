//! Lesson content, the lesson session state machine, and progress statistics.

pub mod content;
pub mod session;
pub mod stats;

pub use content::{ContentRepository, CourseLessonItem, LessonStatus};
pub use session::{
    LessonSession, OverviewMode, RETRY_MESSAGE, SUCCESS_MESSAGE, SessionEffect, SessionEvent,
    SessionState, ShellRequest,
};
pub use stats::{OverallProgress, ProgressStats, calculate_progress, render_progress_bar};
