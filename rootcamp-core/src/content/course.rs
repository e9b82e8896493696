use std::collections::BTreeMap;

use rootcamp_lab::Lesson;
use rootcamp_progress_store::UserProgress;
use serde::{Deserialize, Serialize};

/// Contents of `course.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseData {
    pub course: Course,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<CourseLessonRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLessonRef {
    pub lesson_id: String,
    pub sequence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    Locked,
    Unlocked,
    Complete,
}

impl LessonStatus {
    pub fn is_selectable(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// A lesson placed in an ordered list, with its lock status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLessonItem {
    pub lesson: Lesson,
    pub sequence: u32,
    pub status: LessonStatus,
}

/// Resolve the course references against `lessons` and compute lock status.
///
/// The first resolvable lesson is unlocked, and each later one unlocks once
/// its predecessor in the resolved list is complete. References to unknown
/// lessons are skipped.
pub fn course_items<'a>(
    course: &Course,
    lookup: impl Fn(&str) -> Option<&'a Lesson>,
    progress: &BTreeMap<String, UserProgress>,
) -> Vec<CourseLessonItem> {
    let mut items: Vec<CourseLessonItem> = Vec::with_capacity(course.lessons.len());

    for reference in &course.lessons {
        let Some(lesson) = lookup(&reference.lesson_id) else {
            continue;
        };

        let unlocked = match items.last() {
            None => true,
            Some(previous) => previous.status == LessonStatus::Complete,
        };
        let status = if is_completed(progress, &lesson.id) {
            LessonStatus::Complete
        } else if unlocked {
            LessonStatus::Unlocked
        } else {
            LessonStatus::Locked
        };

        items.push(CourseLessonItem {
            lesson: lesson.clone(),
            sequence: reference.sequence,
            status,
        });
    }

    items
}

/// First lesson the learner can work on next.
pub fn next_unlocked(items: &[CourseLessonItem]) -> Option<&CourseLessonItem> {
    items
        .iter()
        .find(|item| item.status == LessonStatus::Unlocked)
}

/// `(completed, total)` over the course.
pub fn course_progress(items: &[CourseLessonItem]) -> (usize, usize) {
    let completed = items
        .iter()
        .filter(|item| item.status == LessonStatus::Complete)
        .count();
    (completed, items.len())
}

pub(crate) fn is_completed(progress: &BTreeMap<String, UserProgress>, lesson_id: &str) -> bool {
    progress
        .get(lesson_id)
        .is_some_and(|record| record.completed)
}
