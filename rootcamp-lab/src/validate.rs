//! Answer validation against a lesson's requirements.

use std::fs;
use std::path::Path;

use regex::Regex;
use rootcamp_commons::{canonicalize_existing, resolve_within};
use tracing::debug;

use crate::lesson::{Lesson, Requirement, ValidatorKind};
use crate::placeholders::{substitute_sandbox, substitute_secret};

pub const NO_REQUIREMENTS_HINT: &str = "No requirements defined";

/// Outcome of validating one answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub matched: bool,
    /// Description of the first requirement when nothing matched
    pub hint: String,
}

impl Validation {
    fn matched() -> Self {
        Self {
            matched: true,
            hint: String::new(),
        }
    }

    fn failed(hint: impl Into<String>) -> Self {
        Self {
            matched: false,
            hint: hint.into(),
        }
    }
}

/// Check `input` against every requirement of `lesson` in order; the first
/// accepting requirement wins. `secret` replaces the secret-code token in
/// expected values before any comparison.
pub fn validate_lesson(
    lesson: &Lesson,
    input: &str,
    sandbox: Option<&Path>,
    secret: Option<&str>,
) -> Validation {
    let Some(first) = lesson.requirements.first() else {
        return Validation::failed(NO_REQUIREMENTS_HINT);
    };

    for requirement in &lesson.requirements {
        let expected = match secret {
            Some(secret) => substitute_secret(&requirement.expected, secret),
            None => requirement.expected.clone(),
        };
        if check(requirement.validator, &expected, input, sandbox) {
            debug!(lesson = %lesson.id, validator = ?requirement.validator, "answer accepted");
            return Validation::matched();
        }
    }

    Validation::failed(first.description.clone())
}

/// Check a single requirement as written, without secret substitution.
pub fn validate_requirement(requirement: &Requirement, input: &str, sandbox: Option<&Path>) -> bool {
    check(requirement.validator, &requirement.expected, input, sandbox)
}

fn check(kind: ValidatorKind, expected: &str, input: &str, sandbox: Option<&Path>) -> bool {
    let input = input.trim();
    match kind {
        ValidatorKind::Exact => expected.trim() == input,
        ValidatorKind::PathMatch => match sandbox {
            Some(sandbox) => substitute_sandbox(expected, sandbox).trim() == input,
            None => false,
        },
        ValidatorKind::FileCheck => sandbox.is_some_and(|sandbox| file_exists(sandbox, expected)),
        ValidatorKind::Regex => match Regex::new(expected) {
            Ok(pattern) => pattern.is_match(input),
            Err(err) => {
                debug!(pattern = expected, error = %err, "invalid requirement pattern");
                false
            }
        },
        ValidatorKind::Unknown => false,
    }
}

/// True when `expected` names an entry inside the sandbox.
///
/// The name must not be blank or the sandbox itself, and no symlinked parent
/// may lead outside. A final component that is a symlink counts as present
/// whether or not its target exists.
fn file_exists(sandbox: &Path, expected: &str) -> bool {
    let expected = expected.trim();
    if expected.is_empty() {
        return false;
    }
    let path = match resolve_within(sandbox, Path::new(expected)) {
        Ok(path) => path,
        Err(err) => {
            debug!(error = %err, "file check escapes the sandbox");
            return false;
        }
    };
    if path == sandbox {
        return false;
    }

    let inside = match (
        fs::canonicalize(sandbox),
        path.parent().map(canonicalize_existing),
    ) {
        (Ok(root), Some(Ok(parent))) => parent.starts_with(root),
        _ => false,
    };
    if !inside {
        debug!(path = %path.display(), "file check leaves the sandbox through a symlink");
        return false;
    }
    fs::symlink_metadata(&path).is_ok()
}
