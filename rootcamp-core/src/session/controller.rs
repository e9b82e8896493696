use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rootcamp_commons::slug::secret_code;
use rootcamp_lab::placeholders::{needs_secret, render_display};
use rootcamp_lab::{Lesson, Materializer, Sandbox, validate_lesson};
use rootcamp_progress_store::{ProgressStore, UserProgress};
use tracing::{debug, error, info, warn};

use super::shell::ShellRequest;
use crate::content::{ContentRepository, CourseLessonItem, LessonStatus, course_progress};

pub const SUCCESS_MESSAGE: &str = "Congratulations! You've completed this lesson! 🎉";
pub const RETRY_MESSAGE: &str = "❌ Incorrect answer. Try again!";
const MAX_INPUT_CHARS: usize = 200;

/// Which list the session starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewMode {
    /// Every lesson, free choice
    Catalog,
    /// Course order with locking
    Guided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Overview,
    Detail,
    LabRunning,
    CodeInput,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Select(String),
    StartLab,
    EnterCode,
    Input(char),
    Backspace,
    Submit,
    Cancel,
    Acknowledge,
    /// The lab shell returned; `error` is set when it never started
    ShellExited { error: Option<String> },
}

/// Work the host must perform on behalf of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    None,
    /// Run the shell to completion, then deliver [`SessionEvent::ShellExited`]
    LaunchShell(ShellRequest),
    /// The session left its overview and is no longer active
    Closed,
}

/// Drives one learner through lessons: overview, detail, lab shell, answer,
/// success. Owns at most one sandbox at a time.
pub struct LessonSession {
    mode: OverviewMode,
    content: Arc<ContentRepository>,
    progress: Arc<dyn ProgressStore>,
    materializer: Materializer,
    shell_program: String,

    active: bool,
    state: SessionState,
    lesson: Option<Lesson>,
    sandbox: Option<Sandbox>,
    secret: Option<String>,
    input: String,
    feedback: Option<String>,
    progress_cache: BTreeMap<String, UserProgress>,
}

impl LessonSession {
    pub fn new(
        mode: OverviewMode,
        content: Arc<ContentRepository>,
        progress: Arc<dyn ProgressStore>,
        materializer: Materializer,
    ) -> Self {
        Self {
            mode,
            content,
            progress,
            materializer,
            shell_program: String::from("bash"),
            active: false,
            state: SessionState::Overview,
            lesson: None,
            sandbox: None,
            secret: None,
            input: String::new(),
            feedback: None,
            progress_cache: BTreeMap::new(),
        }
    }

    /// Activate at the overview. `shell_program` is exec'd inside labs.
    pub fn open(&mut self, shell_program: impl Into<String>) {
        self.shell_program = shell_program.into();
        self.active = true;
        self.state = SessionState::Overview;
        self.clear_lesson();
        self.refresh_progress();
        debug!(mode = ?self.mode, "lesson session opened");
    }

    /// Leave the flow, reaping any live sandbox.
    pub fn close(&mut self) {
        self.reap_sandbox();
        self.clear_lesson();
        self.state = SessionState::Overview;
        self.active = false;
        debug!(mode = ?self.mode, "lesson session closed");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle(&mut self, event: SessionEvent) -> SessionEffect {
        if !self.active {
            return SessionEffect::None;
        }

        match (self.state, event) {
            (SessionState::Overview, SessionEvent::Select(id)) => {
                self.select(&id);
                SessionEffect::None
            }
            (SessionState::Overview, SessionEvent::Cancel) => {
                self.close();
                SessionEffect::Closed
            }

            (SessionState::Detail, SessionEvent::StartLab) => self.start_lab(),
            (SessionState::Detail, SessionEvent::EnterCode) => {
                self.enter_code_input();
                SessionEffect::None
            }
            (SessionState::Detail, SessionEvent::Cancel) => {
                self.reap_sandbox();
                self.clear_lesson();
                self.state = SessionState::Overview;
                SessionEffect::None
            }

            (SessionState::LabRunning, SessionEvent::ShellExited { error: None }) => {
                self.enter_code_input();
                SessionEffect::None
            }
            (SessionState::LabRunning, SessionEvent::ShellExited { error: Some(error) }) => {
                warn!(error = %error, "lab shell failed to start");
                self.state = SessionState::Detail;
                self.feedback = Some(format!("Failed to launch shell: {error}"));
                SessionEffect::None
            }

            (SessionState::CodeInput, SessionEvent::Input(ch)) => {
                if !ch.is_control() && self.input.chars().count() < MAX_INPUT_CHARS {
                    self.input.push(ch);
                }
                SessionEffect::None
            }
            (SessionState::CodeInput, SessionEvent::Backspace) => {
                self.input.pop();
                SessionEffect::None
            }
            (SessionState::CodeInput, SessionEvent::Submit) => {
                self.submit();
                SessionEffect::None
            }
            (SessionState::CodeInput, SessionEvent::Cancel) => {
                self.input.clear();
                self.feedback = None;
                self.state = SessionState::Detail;
                SessionEffect::None
            }

            (SessionState::Success, SessionEvent::Acknowledge) => {
                self.clear_lesson();
                self.state = SessionState::Overview;
                self.refresh_progress();
                SessionEffect::None
            }

            (state, event) => {
                debug!(?state, ?event, "event ignored");
                SessionEffect::None
            }
        }
    }

    fn select(&mut self, id: &str) {
        let Some(item) = self.overview_items().into_iter().find(|item| item.lesson.id == id) else {
            debug!(lesson = id, "unknown lesson selected");
            return;
        };
        if !item.status.is_selectable() {
            debug!(lesson = id, "locked lesson selected");
            return;
        }

        let lesson = item.lesson;
        self.secret = (lesson.skip_sandbox && needs_secret(&lesson)).then(secret_code);
        self.input.clear();
        self.feedback = None;
        self.lesson = Some(lesson);
        self.state = SessionState::Detail;
    }

    fn start_lab(&mut self) -> SessionEffect {
        let Some(lesson) = self.lesson.as_ref() else {
            return SessionEffect::None;
        };

        if lesson.skip_sandbox {
            self.enter_code_input();
            return SessionEffect::None;
        }

        if self.sandbox.is_none() {
            match self.materializer.create(lesson) {
                Ok(sandbox) => self.sandbox = Some(sandbox),
                Err(err) => {
                    warn!(lesson = %lesson.id, error = %err, "sandbox creation failed");
                    self.feedback = Some(format!("Failed to create sandbox: {err}"));
                    return SessionEffect::None;
                }
            }
        }

        let Some(sandbox) = self.sandbox.as_ref() else {
            return SessionEffect::None;
        };
        let request = ShellRequest {
            working_dir: sandbox.start_path(lesson),
            sandbox_path: sandbox.path().to_path_buf(),
            lesson_title: lesson.title.clone(),
            code: lesson.code.clone(),
            instructions: render_display(
                &lesson.instructions,
                Some(sandbox.path()),
                self.secret.as_deref(),
            ),
            program: self.shell_program.clone(),
        };

        self.feedback = None;
        self.state = SessionState::LabRunning;
        info!(lesson = %lesson.id, "launching lab shell");
        SessionEffect::LaunchShell(request)
    }

    fn enter_code_input(&mut self) {
        self.input.clear();
        self.state = SessionState::CodeInput;
    }

    fn submit(&mut self) {
        let Some(lesson) = self.lesson.as_ref() else {
            return;
        };
        let answer = self.input.trim().to_string();
        let sandbox_path = self.sandbox.as_ref().map(Sandbox::path);
        let result = validate_lesson(lesson, &answer, sandbox_path, self.secret.as_deref());
        let lesson_id = lesson.id.clone();

        if result.matched {
            if let Err(err) = self.progress.mark_complete(&lesson_id) {
                warn!(lesson = %lesson_id, error = %err, "failed to record completion");
            }
            self.reap_sandbox();
            self.feedback = Some(SUCCESS_MESSAGE.to_string());
            self.state = SessionState::Success;
            info!(lesson = %lesson_id, "lesson completed");
        } else {
            if let Err(err) = self.progress.increment_attempts(&lesson_id) {
                warn!(lesson = %lesson_id, error = %err, "failed to record attempt");
            }
            self.feedback = Some(if result.hint.is_empty() {
                RETRY_MESSAGE.to_string()
            } else {
                format!("❌ Incorrect. Hint: {}", result.hint)
            });
        }

        self.input.clear();
        self.refresh_progress();
    }

    fn reap_sandbox(&mut self) {
        if let Some(sandbox) = self.sandbox.take()
            && let Err(err) = sandbox.reap()
        {
            error!(error = %err, "failed to reap sandbox");
        }
    }

    fn clear_lesson(&mut self) {
        self.lesson = None;
        self.secret = None;
        self.input.clear();
        self.feedback = None;
    }

    fn refresh_progress(&mut self) {
        match self.progress.get_all_progress() {
            Ok(progress) => self.progress_cache = progress,
            Err(err) => warn!(error = %err, "failed to read progress"),
        }
    }

    pub fn mode(&self) -> OverviewMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn sandbox_path(&self) -> Option<&Path> {
        self.sandbox.as_ref().map(Sandbox::path)
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Current lesson text with placeholders filled in.
    pub fn display_text(&self, text: &str) -> String {
        render_display(text, self.sandbox_path(), self.secret.as_deref())
    }

    /// Stored progress for `lesson_id` as of the last refresh.
    pub fn lesson_progress(&self, lesson_id: &str) -> Option<&UserProgress> {
        self.progress_cache.get(lesson_id)
    }

    /// Lessons listed at the overview, with their status for this mode.
    pub fn overview_items(&self) -> Vec<CourseLessonItem> {
        match self.mode {
            OverviewMode::Guided => self.content.course_items(&self.progress_cache),
            OverviewMode::Catalog => self
                .content
                .lessons()
                .zip(1..)
                .map(|(lesson, sequence)| CourseLessonItem {
                    lesson: lesson.clone(),
                    sequence,
                    status: if self
                        .progress_cache
                        .get(&lesson.id)
                        .is_some_and(|record| record.completed)
                    {
                        LessonStatus::Complete
                    } else {
                        LessonStatus::Unlocked
                    },
                })
                .collect(),
        }
    }

    /// `(completed, total)` over the overview list.
    pub fn overview_progress(&self) -> (usize, usize) {
        course_progress(&self.overview_items())
    }

    pub fn content(&self) -> &ContentRepository {
        &self.content
    }
}

impl Drop for LessonSession {
    fn drop(&mut self) {
        self.reap_sandbox();
    }
}
