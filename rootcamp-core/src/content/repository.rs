use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use rootcamp_config::ContentConfig;
use rootcamp_lab::Lesson;
use rootcamp_progress_store::UserProgress;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::course::{CourseData, CourseLessonItem, course_items};

/// Built-in lesson packs, in load order.
const EMBEDDED_LESSONS: &[(&str, &str)] = &[
    (
        "00-welcome.json",
        include_str!("../../data/lessons/00-welcome.json"),
    ),
    (
        "01-navigation.json",
        include_str!("../../data/lessons/01-navigation.json"),
    ),
    (
        "02-files.json",
        include_str!("../../data/lessons/02-files.json"),
    ),
    (
        "03-search.json",
        include_str!("../../data/lessons/03-search.json"),
    ),
    (
        "04-links.json",
        include_str!("../../data/lessons/04-links.json"),
    ),
];

const EMBEDDED_COURSE: &str = include_str!("../../data/course.json");

/// One lesson pack file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LessonPack {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Read-only lesson catalog plus the guided course ordering.
#[derive(Debug, Clone, Default)]
pub struct ContentRepository {
    lessons: IndexMap<String, Lesson>,
    course: CourseData,
}

impl ContentRepository {
    /// Build a repository from already-parsed content.
    pub fn from_parts(lessons: impl IntoIterator<Item = Lesson>, course: CourseData) -> Self {
        let mut map = IndexMap::new();
        for lesson in lessons {
            if map.contains_key(&lesson.id) {
                warn!(lesson = %lesson.id, "duplicate lesson id ignored");
                continue;
            }
            map.insert(lesson.id.clone(), lesson);
        }
        Self {
            lessons: map,
            course,
        }
    }

    /// Lessons and course compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let mut lessons = Vec::new();
        for (name, raw) in EMBEDDED_LESSONS {
            lessons.extend(parse_pack(name, raw)?.lessons);
        }
        let course = parse_course("course.json", EMBEDDED_COURSE)?;
        Ok(Self::from_parts(lessons, course))
    }

    /// Load every `*.json` pack in `dir`, in file name order.
    pub fn from_dir(dir: &Path, course_file: Option<&Path>) -> Result<Self> {
        let mut files = fs::read_dir(dir)
            .with_context(|| format!("Failed to read lessons directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<_>>();
        files.sort();

        let mut lessons = Vec::new();
        for path in &files {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            lessons.extend(parse_pack(&path.display().to_string(), &raw)?.lessons);
        }

        let course = match course_file {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                parse_course(&path.display().to_string(), &raw)?
            }
            None => parse_course("course.json", EMBEDDED_COURSE)?,
        };

        debug!(files = files.len(), lessons = lessons.len(), "loaded external lesson packs");
        Ok(Self::from_parts(lessons, course))
    }

    /// Content selected by the `[content]` section: external when configured,
    /// embedded otherwise.
    pub fn load(config: &ContentConfig) -> Result<Self> {
        let repository = match (config.lessons_dir_path(), config.course_file_path()) {
            (Some(dir), course) => Self::from_dir(&dir, course.as_deref())?,
            (None, Some(course)) => {
                let raw = fs::read_to_string(&course)
                    .with_context(|| format!("Failed to read {}", course.display()))?;
                let course = parse_course(&course.display().to_string(), &raw)?;
                let embedded = Self::embedded()?;
                Self::from_parts(embedded.lessons.into_values(), course)
            }
            (None, None) => Self::embedded()?,
        };

        if repository.is_empty() {
            bail!("No lessons available");
        }
        info!(lessons = repository.len(), "lesson content loaded");
        Ok(repository)
    }

    pub fn get(&self, id: &str) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.values()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Lesson> {
        self.lessons()
            .filter(|lesson| lesson.tags.iter().any(|t| t == tag))
            .collect()
    }

    pub fn by_level(&self, level: &str) -> Vec<&Lesson> {
        self.lessons().filter(|lesson| lesson.level == level).collect()
    }

    pub fn by_module(&self, module: &str) -> Vec<&Lesson> {
        self.lessons()
            .filter(|lesson| lesson.module == module)
            .collect()
    }

    /// Distinct non-empty module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self
            .lessons()
            .map(|lesson| lesson.module.as_str())
            .filter(|module| !module.is_empty())
            .collect();
        modules.sort_unstable();
        modules.dedup();
        modules
    }

    pub fn course(&self) -> &CourseData {
        &self.course
    }

    /// Course lessons with lock status computed from `progress`.
    pub fn course_items(&self, progress: &BTreeMap<String, UserProgress>) -> Vec<CourseLessonItem> {
        course_items(&self.course.course, |id| self.get(id), progress)
    }
}

fn parse_pack(name: &str, raw: &str) -> Result<LessonPack> {
    serde_json::from_str(raw).with_context(|| format!("Failed to parse lesson pack {name}"))
}

fn parse_course(name: &str, raw: &str) -> Result<CourseData> {
    serde_json::from_str(raw).with_context(|| format!("Failed to parse course {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_content_parses() {
        let repository = ContentRepository::embedded().unwrap();
        assert!(!repository.is_empty());
        assert!(!repository.modules().is_empty());
    }

    #[test]
    fn embedded_course_references_known_lessons() {
        let repository = ContentRepository::embedded().unwrap();
        for reference in &repository.course().course.lessons {
            assert!(
                repository.get(&reference.lesson_id).is_some(),
                "course references unknown lesson {}",
                reference.lesson_id
            );
        }
    }

    #[test]
    fn embedded_sandbox_lessons_have_requirements() {
        let repository = ContentRepository::embedded().unwrap();
        for lesson in repository.lessons() {
            assert!(
                !lesson.requirements.is_empty(),
                "lesson {} has no requirements",
                lesson.id
            );
        }
    }

    #[test]
    fn duplicate_ids_keep_the_first_lesson() {
        let first = Lesson {
            id: "dup".to_string(),
            title: "First".to_string(),
            ..Lesson::default()
        };
        let second = Lesson {
            title: "Second".to_string(),
            ..first.clone()
        };
        let repository = ContentRepository::from_parts([first, second], CourseData::default());
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.get("dup").unwrap().title, "First");
    }
}
