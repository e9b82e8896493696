use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markdown::MarkdownStorage;

const PROGRESS_KEY: &str = "progress";
const PROGRESS_TITLE: &str = "RootCamp Progress";

/// Completion record for one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub lesson_id: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub attempts: u32,
}

impl UserProgress {
    /// The record a lesson has before anything was submitted.
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            completed: false,
            completed_at: None,
            attempts: 0,
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at.get_or_insert(now);
        self.attempts = self.attempts.max(1);
    }

    fn bump(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}

/// Persistence for lesson progress.
///
/// Implementations are shared between screens, so every method takes `&self`.
pub trait ProgressStore: Send + Sync {
    /// Progress for `lesson_id`; a zero record when nothing is stored.
    fn get_progress(&self, lesson_id: &str) -> Result<UserProgress>;

    /// Mark the lesson complete. The first completion time is kept.
    fn mark_complete(&self, lesson_id: &str) -> Result<()>;

    /// Record one more failed attempt.
    fn increment_attempts(&self, lesson_id: &str) -> Result<()>;

    fn get_all_progress(&self) -> Result<BTreeMap<String, UserProgress>>;

    /// Forget every record.
    fn reset(&self) -> Result<()>;
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ProgressDocument {
    #[serde(default)]
    lessons: BTreeMap<String, UserProgress>,
}

/// Progress kept in `<data_dir>/progress.md`.
#[derive(Debug)]
pub struct MarkdownProgressStore {
    storage: MarkdownStorage,
    write_lock: Mutex<()>,
}

impl MarkdownProgressStore {
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let storage = MarkdownStorage::new(data_dir);
        storage.init().context("Failed to initialize progress store")?;
        Ok(Self {
            storage,
            write_lock: Mutex::new(()),
        })
    }

    fn read(&self) -> Result<ProgressDocument> {
        Ok(self
            .storage
            .load_optional::<ProgressDocument>(PROGRESS_KEY)?
            .unwrap_or_default())
    }

    fn update(&self, lesson_id: &str, apply: impl FnOnce(&mut UserProgress)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut document = self.read()?;
        let record = document
            .lessons
            .entry(lesson_id.to_string())
            .or_insert_with(|| UserProgress::new(lesson_id));
        apply(record);
        debug!(lesson = lesson_id, attempts = record.attempts, completed = record.completed, "progress updated");
        self.storage
            .store(PROGRESS_KEY, &document, PROGRESS_TITLE)
            .context("Failed to save progress")
    }
}

impl ProgressStore for MarkdownProgressStore {
    fn get_progress(&self, lesson_id: &str) -> Result<UserProgress> {
        Ok(self
            .read()?
            .lessons
            .remove(lesson_id)
            .unwrap_or_else(|| UserProgress::new(lesson_id)))
    }

    fn mark_complete(&self, lesson_id: &str) -> Result<()> {
        self.update(lesson_id, |record| record.complete(Utc::now()))
    }

    fn increment_attempts(&self, lesson_id: &str) -> Result<()> {
        self.update(lesson_id, UserProgress::bump)
    }

    fn get_all_progress(&self) -> Result<BTreeMap<String, UserProgress>> {
        Ok(self.read()?.lessons)
    }

    fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.storage.delete(PROGRESS_KEY)
    }
}

/// In-memory progress, used when the data directory is unusable and in tests.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Mutex<BTreeMap<String, UserProgress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get_progress(&self, lesson_id: &str) -> Result<UserProgress> {
        Ok(self
            .records
            .lock()
            .get(lesson_id)
            .cloned()
            .unwrap_or_else(|| UserProgress::new(lesson_id)))
    }

    fn mark_complete(&self, lesson_id: &str) -> Result<()> {
        self.records
            .lock()
            .entry(lesson_id.to_string())
            .or_insert_with(|| UserProgress::new(lesson_id))
            .complete(Utc::now());
        Ok(())
    }

    fn increment_attempts(&self, lesson_id: &str) -> Result<()> {
        self.records
            .lock()
            .entry(lesson_id.to_string())
            .or_insert_with(|| UserProgress::new(lesson_id))
            .bump();
        Ok(())
    }

    fn get_all_progress(&self) -> Result<BTreeMap<String, UserProgress>> {
        Ok(self.records.lock().clone())
    }

    fn reset(&self) -> Result<()> {
        self.records.lock().clear();
        Ok(())
    }
}
