//! Progress aggregation for the progress screen and `rootcamp progress`.

use std::collections::BTreeMap;

use rootcamp_lab::Lesson;
use rootcamp_progress_store::UserProgress;

use crate::content::course::is_completed;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: f64,
}

impl ProgressStats {
    fn record(&mut self, completed: bool) {
        self.total += 1;
        if completed {
            self.completed += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.percentage = if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelStats {
    pub level: String,
    pub stats: ProgressStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleStats {
    pub module: String,
    pub stats: ProgressStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallProgress {
    pub overall: ProgressStats,
    pub by_level: Vec<LevelStats>,
    pub by_module: Vec<ModuleStats>,
}

fn level_rank(level: &str) -> u8 {
    match level {
        "beginner" => 1,
        "intermediate" => 2,
        "advanced" | "expert" => 3,
        _ => 4,
    }
}

/// Completion totals overall, per level, and per module. Lessons without a
/// level or module only count toward the overall figure.
pub fn calculate_progress<'a>(
    lessons: impl IntoIterator<Item = &'a Lesson>,
    progress: &BTreeMap<String, UserProgress>,
) -> OverallProgress {
    let mut overall = ProgressStats::default();
    let mut levels: BTreeMap<&str, ProgressStats> = BTreeMap::new();
    let mut modules: BTreeMap<&str, ProgressStats> = BTreeMap::new();

    for lesson in lessons {
        let completed = is_completed(progress, &lesson.id);
        overall.record(completed);
        if !lesson.level.is_empty() {
            levels.entry(lesson.level.as_str()).or_default().record(completed);
        }
        if !lesson.module.is_empty() {
            modules.entry(lesson.module.as_str()).or_default().record(completed);
        }
    }

    let mut by_level: Vec<LevelStats> = levels
        .into_iter()
        .map(|(level, stats)| LevelStats {
            level: level.to_string(),
            stats: stats.finish(),
        })
        .collect();
    // stable sort keeps unknown levels alphabetical after the known ones
    by_level.sort_by_key(|entry| level_rank(&entry.level));

    let by_module = modules
        .into_iter()
        .map(|(module, stats)| ModuleStats {
            module: module.to_string(),
            stats: stats.finish(),
        })
        .collect();

    OverallProgress {
        overall: overall.finish(),
        by_level,
        by_module,
    }
}

/// A `width`-cell bar of `█` (done) and `░` (remaining).
pub fn render_progress_bar(percentage: f64, width: usize) -> String {
    let ratio = (percentage / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('█', filled));
    bar.extend(std::iter::repeat_n('░', width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lesson(id: &str, level: &str, module: &str) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: id.to_string(),
            level: level.to_string(),
            module: module.to_string(),
            ..Lesson::default()
        }
    }

    fn completed(ids: &[&str]) -> BTreeMap<String, UserProgress> {
        ids.iter()
            .map(|id| {
                let mut record = UserProgress::new(*id);
                record.completed = true;
                (id.to_string(), record)
            })
            .collect()
    }

    #[test]
    fn aggregates_by_level_and_module() {
        let lessons = [
            lesson("a", "advanced", "links"),
            lesson("b", "beginner", "navigation"),
            lesson("c", "beginner", "files"),
            lesson("d", "intermediate", "files"),
            lesson("e", "", ""),
        ];
        let progress = completed(&["b", "c", "e"]);

        let stats = calculate_progress(&lessons, &progress);

        assert_eq!(stats.overall.total, 5);
        assert_eq!(stats.overall.completed, 3);
        assert!((stats.overall.percentage - 60.0).abs() < f64::EPSILON);

        let levels: Vec<_> = stats
            .by_level
            .iter()
            .map(|entry| (entry.level.as_str(), entry.stats.completed, entry.stats.total))
            .collect();
        assert_eq!(
            levels,
            vec![("beginner", 2, 2), ("intermediate", 0, 1), ("advanced", 0, 1)]
        );

        let modules: Vec<_> = stats
            .by_module
            .iter()
            .map(|entry| entry.module.as_str())
            .collect();
        assert_eq!(modules, vec!["files", "links", "navigation"]);
    }

    #[test]
    fn unknown_levels_sort_last() {
        let lessons = [lesson("a", "wizard", "m"), lesson("b", "expert", "m")];
        let stats = calculate_progress(&lessons, &BTreeMap::new());
        assert_eq!(stats.by_level[0].level, "expert");
        assert_eq!(stats.by_level[1].level, "wizard");
    }

    #[test]
    fn empty_catalog_is_zero_percent() {
        let stats = calculate_progress(std::iter::empty(), &BTreeMap::new());
        assert_eq!(stats.overall, ProgressStats::default());
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(render_progress_bar(50.0, 4), "██░░");
        assert_eq!(render_progress_bar(0.0, 3), "░░░");
        assert_eq!(render_progress_bar(250.0, 2), "██");
        assert_eq!(render_progress_bar(33.3, 10).chars().count(), 10);
    }
}
