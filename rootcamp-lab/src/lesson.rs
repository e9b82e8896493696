//! Declarative lesson content.
//!
//! Lessons are read-only for the whole process; the lab only ever borrows
//! them. JSON field names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One unit of training content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub command: String,
    /// Short command code shown in menus and in the lab prompt
    #[serde(default)]
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub about: LessonAbout,
    #[serde(default)]
    pub hints: Vec<String>,
    /// The answer is typed directly; no sandbox or shell is involved
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_sandbox: bool,
    #[serde(default)]
    pub sandbox: SandboxSpec,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonAbout {
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub common_uses: Vec<String>,
}

/// Directory tree materialized for a lesson. Every path is relative to the
/// sandbox root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_dir: Option<String>,
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Link name to link target; targets are written verbatim
    #[serde(default)]
    pub symlinks: BTreeMap<String, String>,
}

impl SandboxSpec {
    pub fn start_dir(&self) -> Option<&str> {
        self.start_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    Exact,
    PathMatch,
    FileCheck,
    Regex,
    #[serde(other)]
    Unknown,
}

/// One typed rule an answer may satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Requirement {
    /// Informational label, not used for validation
    #[serde(rename = "type", default)]
    pub kind_label: String,
    #[serde(default)]
    pub description: String,
    pub validator: ValidatorKind,
    #[serde(default)]
    pub expected: String,
}

impl Requirement {
    pub fn new(validator: ValidatorKind, expected: impl Into<String>) -> Self {
        Self {
            kind_label: String::new(),
            description: String::new(),
            validator,
            expected: expected.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
