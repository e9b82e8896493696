//! Lesson content and the guided course.

pub mod course;
mod repository;

pub use course::{
    Course, CourseData, CourseLessonItem, CourseLessonRef, LessonStatus, course_progress,
    next_unlocked,
};
pub use repository::{ContentRepository, LessonPack};
