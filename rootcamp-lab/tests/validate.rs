use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rootcamp_lab::{
    Lesson, NO_REQUIREMENTS_HINT, Requirement, ValidatorKind, validate_lesson,
    validate_requirement,
};
use tempfile::TempDir;

fn lesson(requirements: Vec<Requirement>) -> Lesson {
    Lesson {
        id: "validate".to_string(),
        title: "Validate".to_string(),
        requirements,
        ..Lesson::default()
    }
}

#[test]
fn any_requirement_may_match_and_first_hint_is_reported() {
    let lesson = lesson(vec![
        Requirement::new(ValidatorKind::Exact, "A").with_description("hint for A"),
        Requirement::new(ValidatorKind::Exact, "B").with_description("hint for B"),
    ]);

    assert!(validate_lesson(&lesson, "B", None, None).matched);

    let failed = validate_lesson(&lesson, "C", None, None);
    assert!(!failed.matched);
    assert_eq!(failed.hint, "hint for A");
}

#[test]
fn empty_requirement_list_never_matches() {
    let failed = validate_lesson(&lesson(Vec::new()), "", None, None);
    assert!(!failed.matched);
    assert_eq!(failed.hint, NO_REQUIREMENTS_HINT);
}

#[test]
fn path_match_substitutes_live_sandbox() {
    let sandbox = Path::new("/tmp/rootcamp-abc12");
    let current = Requirement::new(ValidatorKind::PathMatch, "{SANDBOX}/out.txt");
    let legacy = Requirement::new(ValidatorKind::PathMatch, "/tmp/rootcamp-{uuid}/out.txt");

    for requirement in [&current, &legacy] {
        assert!(validate_requirement(
            requirement,
            "/tmp/rootcamp-abc12/out.txt",
            Some(sandbox)
        ));
        assert!(validate_requirement(
            requirement,
            "  /tmp/rootcamp-abc12/out.txt\n",
            Some(sandbox)
        ));
        assert!(!validate_requirement(
            requirement,
            "/tmp/rootcamp-zzz99/out.txt",
            Some(sandbox)
        ));
        assert!(!validate_requirement(
            requirement,
            "/tmp/rootcamp-abc12/other.txt",
            Some(sandbox)
        ));
    }
}

#[test]
fn file_check_ignores_input_and_checks_existence() {
    let sandbox = TempDir::new().unwrap();
    fs::create_dir_all(sandbox.path().join("notes")).unwrap();
    fs::write(sandbox.path().join("notes/done.txt"), "").unwrap();

    let present = Requirement::new(ValidatorKind::FileCheck, "notes/done.txt");
    let missing = Requirement::new(ValidatorKind::FileCheck, "notes/missing.txt");

    for input in ["", "whatever", "notes/missing.txt"] {
        assert!(validate_requirement(&present, input, Some(sandbox.path())));
        assert!(!validate_requirement(&missing, input, Some(sandbox.path())));
    }
}

#[test]
fn file_check_never_looks_outside_the_sandbox() {
    let parent = TempDir::new().unwrap();
    let sandbox = parent.path().join("rootcamp-inner");
    fs::create_dir(&sandbox).unwrap();
    fs::write(parent.path().join("outside.txt"), "").unwrap();

    let escape = Requirement::new(ValidatorKind::FileCheck, "../outside.txt");
    assert!(!validate_requirement(&escape, "", Some(&sandbox)));

    let absolute = Requirement::new(
        ValidatorKind::FileCheck,
        parent.path().join("outside.txt").to_string_lossy(),
    );
    assert!(!validate_requirement(&absolute, "", Some(&sandbox)));
}

#[cfg(unix)]
#[test]
fn file_check_does_not_follow_symlinked_parents_outside() {
    let sandbox = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.txt"), "").unwrap();
    std::os::unix::fs::symlink(outside.path(), sandbox.path().join("l")).unwrap();

    let through_link = Requirement::new(ValidatorKind::FileCheck, "l/secret.txt");
    assert!(!validate_requirement(&through_link, "", Some(sandbox.path())));

    let link_itself = Requirement::new(ValidatorKind::FileCheck, "l");
    assert!(validate_requirement(&link_itself, "", Some(sandbox.path())));
}

#[cfg(unix)]
#[test]
fn file_check_counts_dangling_symlink_as_present() {
    let sandbox = TempDir::new().unwrap();
    std::os::unix::fs::symlink("nowhere", sandbox.path().join("broken")).unwrap();

    let requirement = Requirement::new(ValidatorKind::FileCheck, "broken");
    assert!(validate_requirement(&requirement, "", Some(sandbox.path())));
}

#[test]
fn file_check_must_name_an_entry() {
    let sandbox = TempDir::new().unwrap();
    for expected in ["", "   ", ".", "./", "a/.."] {
        let requirement = Requirement::new(ValidatorKind::FileCheck, expected);
        assert!(
            !validate_requirement(&requirement, "", Some(sandbox.path())),
            "{expected:?}"
        );
    }
}

#[test]
fn legacy_sandbox_token_keeps_its_surroundings() {
    let sandbox = Path::new("/tmp/rootcamp-abc12");
    let requirement =
        Requirement::new(ValidatorKind::PathMatch, "file:/tmp/rootcamp-{uuid}/out.txt");

    assert!(validate_requirement(
        &requirement,
        "file:/tmp/rootcamp-abc12/out.txt",
        Some(sandbox)
    ));
    assert!(!validate_requirement(
        &requirement,
        "/tmp/rootcamp-abc12/out.txt",
        Some(sandbox)
    ));
}

#[test]
fn file_check_without_sandbox_fails() {
    let requirement = Requirement::new(ValidatorKind::FileCheck, "notes/done.txt");
    assert!(!validate_requirement(&requirement, "", None));
}

#[test]
fn regex_matches_anywhere_in_trimmed_input() {
    let requirement = Requirement::new(ValidatorKind::Regex, r"^ls\s+-la?$");
    assert!(validate_requirement(&requirement, "  ls -la  ", None));
    assert!(validate_requirement(&requirement, "ls -l", None));
    assert!(!validate_requirement(&requirement, "ls", None));

    let unanchored = Requirement::new(ValidatorKind::Regex, "grep");
    assert!(validate_requirement(&unanchored, "cat log | grep ERROR", None));
}

#[test]
fn invalid_regex_fails_closed() {
    let lesson = lesson(vec![
        Requirement::new(ValidatorKind::Regex, "[unbalanced").with_description("broken"),
    ]);
    for input in ["", "[unbalanced", "anything at all"] {
        let result = validate_lesson(&lesson, input, None, None);
        assert!(!result.matched);
        assert_eq!(result.hint, "broken");
    }
}

#[test]
fn secret_code_lesson_accepts_generated_value() {
    let lesson = lesson(vec![
        Requirement::new(ValidatorKind::Exact, "{SECRET_CODE}")
            .with_description("Paste the code shown above"),
    ]);
    let secret = rootcamp_commons::slug::secret_code();

    assert!(validate_lesson(&lesson, &secret, None, Some(&secret)).matched);
    let failed = validate_lesson(&lesson, "AAAA-BBBB-CCCC", None, Some("DDDD-EEEE-FFFF"));
    assert_eq!(failed.hint, "Paste the code shown above");
}
