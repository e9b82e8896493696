use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rootcamp_lab::{
    ActiveSandboxRegistry, Lesson, Materializer, ProvisionError, ReapError, Requirement,
    SandboxSpec, ScratchRoot, ValidatorKind, validate_lesson,
};
use tempfile::TempDir;

fn materializer(scratch: &TempDir) -> Materializer {
    Materializer::new(
        ScratchRoot::new(scratch.path(), "rootcamp"),
        ActiveSandboxRegistry::new(),
    )
}

fn lesson(spec: SandboxSpec) -> Lesson {
    Lesson {
        id: "fixture".to_string(),
        title: "Fixture".to_string(),
        sandbox: spec,
        ..Lesson::default()
    }
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();
    entries
}

#[test]
fn materializes_scenario_and_validates_answer() {
    let scratch = TempDir::new().unwrap();
    let mut lesson = lesson(SandboxSpec {
        dirs: vec!["a/b".to_string()],
        files: [("a/b/secret.txt".to_string(), "XYZ".to_string())]
            .into_iter()
            .collect(),
        ..SandboxSpec::default()
    });
    lesson.requirements = vec![
        Requirement::new(ValidatorKind::Exact, "XYZ").with_description("Read the secret file"),
    ];

    let sandbox = materializer(&scratch).create(&lesson).unwrap();
    let path = sandbox.path().to_path_buf();

    assert!(path.is_absolute());
    assert_eq!(
        fs::read_to_string(path.join("a/b/secret.txt")).unwrap(),
        "XYZ"
    );

    let accepted = validate_lesson(&lesson, "XYZ", Some(&path), None);
    assert!(accepted.matched);
    assert_eq!(accepted.hint, "");

    let rejected = validate_lesson(&lesson, "xyz ", Some(&path), None);
    assert!(!rejected.matched);
    assert_eq!(rejected.hint, "Read the secret file");
}

#[test]
fn sandbox_is_named_under_scratch_prefix() {
    let scratch = TempDir::new().unwrap();
    let sandbox = materializer(&scratch).create(&lesson(SandboxSpec::default())).unwrap();

    let name = sandbox.path().file_name().unwrap().to_string_lossy().into_owned();
    let id = name.strip_prefix("rootcamp-").unwrap();
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_eq!(sandbox.path().parent(), Some(scratch.path()));
}

#[test]
fn create_then_reap_leaves_nothing() {
    let scratch = TempDir::new().unwrap();
    let spec = SandboxSpec {
        start_dir: Some("projects".to_string()),
        dirs: vec!["projects/web".to_string(), "logs".to_string()],
        files: [
            ("projects/web/index.html".to_string(), "<h1>hi</h1>".to_string()),
            ("notes.txt".to_string(), "remember".to_string()),
        ]
        .into_iter()
        .collect(),
        symlinks: [("latest".to_string(), "projects/web".to_string())]
            .into_iter()
            .collect(),
    };

    let sandbox = materializer(&scratch).create(&lesson(spec)).unwrap();
    let path = sandbox.path().to_path_buf();
    assert!(path.join("projects/web/index.html").is_file());
    #[cfg(unix)]
    assert_eq!(
        fs::read_link(path.join("latest")).unwrap(),
        PathBuf::from("projects/web")
    );

    sandbox.reap().unwrap();
    assert!(!path.exists());
    assert!(entries(scratch.path()).is_empty());
}

#[test]
fn dropping_the_handle_reaps_the_sandbox() {
    let scratch = TempDir::new().unwrap();
    let path = {
        let sandbox = materializer(&scratch).create(&lesson(SandboxSpec::default())).unwrap();
        sandbox.path().to_path_buf()
    };
    assert!(!path.exists());
}

#[test]
fn registry_take_prevents_second_reap() {
    let scratch = TempDir::new().unwrap();
    let materializer = materializer(&scratch);
    let sandbox = materializer.create(&lesson(SandboxSpec::default())).unwrap();
    let path = sandbox.path().to_path_buf();

    // Interrupt handler path: take from the registry and reap directly.
    let taken = materializer.registry().take().unwrap();
    assert_eq!(taken, path);
    materializer.scratch().cleanup(&taken).unwrap();

    // The handle sees the slot is empty and leaves the directory alone.
    fs::create_dir(&path).unwrap();
    sandbox.reap().unwrap();
    assert!(path.exists());
    materializer.scratch().cleanup(&path).unwrap();
}

#[test]
fn reaping_twice_is_not_an_error() {
    let scratch = TempDir::new().unwrap();
    let materializer = materializer(&scratch);
    let sandbox = materializer.create(&lesson(SandboxSpec::default())).unwrap();
    let path = sandbox.path().to_path_buf();

    sandbox.reap().unwrap();
    materializer.scratch().cleanup(&path).unwrap();
    materializer.scratch().cleanup(&path).unwrap();
}

#[test]
fn sequential_sandboxes_get_distinct_paths() {
    let scratch = TempDir::new().unwrap();
    let materializer = materializer(&scratch);
    let lesson = lesson(SandboxSpec::default());

    let first = materializer.create(&lesson).unwrap();
    let second = materializer.create(&lesson).unwrap();
    assert_ne!(first.path(), second.path());
    assert!(first.path().exists());
    assert!(second.path().exists());
}

#[test]
fn partial_failure_removes_the_sandbox() {
    let scratch = TempDir::new().unwrap();
    // "a" becomes a regular file, so "a/b.txt" cannot get a parent directory.
    let spec = SandboxSpec {
        files: [
            ("a".to_string(), "plain file".to_string()),
            ("a/b.txt".to_string(), "nested".to_string()),
        ]
        .into_iter()
        .collect(),
        ..SandboxSpec::default()
    };

    let materializer = materializer(&scratch);
    let error = materializer.create(&lesson(spec)).unwrap_err();
    assert!(matches!(
        error,
        ProvisionError::CreateDir { .. } | ProvisionError::WriteFile { .. }
    ));
    assert!(entries(scratch.path()).is_empty());
    assert_eq!(materializer.registry().current(), None);
}

#[test]
fn escaping_paths_are_rejected_before_any_mutation() {
    let scratch = TempDir::new().unwrap();
    let materializer = materializer(&scratch);

    let specs = [
        SandboxSpec {
            files: [("../escape.txt".to_string(), "x".to_string())]
                .into_iter()
                .collect(),
            ..SandboxSpec::default()
        },
        SandboxSpec {
            dirs: vec!["ok/../../../up".to_string()],
            ..SandboxSpec::default()
        },
        SandboxSpec {
            symlinks: [("/abs/link".to_string(), "target".to_string())]
                .into_iter()
                .collect(),
            ..SandboxSpec::default()
        },
        SandboxSpec {
            start_dir: Some("../..".to_string()),
            ..SandboxSpec::default()
        },
    ];

    for spec in specs {
        let error = materializer.create(&lesson(spec)).unwrap_err();
        assert!(matches!(error, ProvisionError::PathEscape(_)), "{error}");
    }
    assert!(entries(scratch.path()).is_empty());
    assert!(!scratch.path().parent().unwrap().join("escape.txt").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_parent_cannot_carry_writes_out_of_the_sandbox() {
    let scratch = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let spec = SandboxSpec {
        symlinks: [
            ("l".to_string(), outside.path().to_string_lossy().into_owned()),
            ("l/planted".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect(),
        ..SandboxSpec::default()
    };

    let materializer = materializer(&scratch);
    let error = materializer.create(&lesson(spec)).unwrap_err();
    assert!(matches!(error, ProvisionError::PathEscape(_)), "{error}");
    assert!(entries(outside.path()).is_empty());
    assert!(entries(scratch.path()).is_empty());
    assert_eq!(materializer.registry().current(), None);
}

#[cfg(unix)]
#[test]
fn symlinks_pointing_outside_are_still_created() {
    let scratch = TempDir::new().unwrap();
    let spec = SandboxSpec {
        symlinks: [("etc-link".to_string(), "/etc".to_string())]
            .into_iter()
            .collect(),
        ..SandboxSpec::default()
    };

    let sandbox = materializer(&scratch).create(&lesson(spec)).unwrap();
    let link = sandbox.path().join("etc-link");
    assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("/etc"));
}

#[test]
fn reaper_refuses_paths_outside_scratch_root() {
    let scratch = TempDir::new().unwrap();
    let root = ScratchRoot::new(scratch.path(), "rootcamp");

    let victim = scratch.path().join("keep-me");
    fs::create_dir(&victim).unwrap();
    fs::write(victim.join("data.txt"), "precious").unwrap();
    let lookalike = scratch.path().join("rootcampx-abc");
    fs::create_dir(&lookalike).unwrap();

    let candidates = [
        victim.clone(),
        lookalike.clone(),
        scratch.path().to_path_buf(),
        scratch.path().join("rootcamp-"),
        scratch.path().join("rootcamp-abc/../keep-me"),
        PathBuf::from("/"),
    ];
    for candidate in &candidates {
        let error = root.cleanup(candidate).unwrap_err();
        assert!(matches!(error, ReapError::OutsideScratchRoot { .. }));
    }
    assert!(matches!(
        root.cleanup(Path::new("")),
        Err(ReapError::EmptyPath)
    ));

    assert_eq!(
        fs::read_to_string(victim.join("data.txt")).unwrap(),
        "precious"
    );
    assert!(lookalike.exists());
}

#[test]
fn collect_orphans_reaps_only_prefixed_directories() {
    let scratch = TempDir::new().unwrap();
    let root = ScratchRoot::new(scratch.path(), "rootcamp");

    let orphan = scratch.path().join("rootcamp-orphan01");
    fs::create_dir_all(orphan.join("nested")).unwrap();
    let unrelated = scratch.path().join("someone-else");
    fs::create_dir(&unrelated).unwrap();
    let stray_file = scratch.path().join("rootcamp-file");
    fs::write(&stray_file, "not a sandbox").unwrap();

    let reaped = root.collect_orphans().unwrap();
    assert_eq!(reaped, vec![orphan.clone()]);
    assert!(!orphan.exists());
    assert!(unrelated.exists());
    assert!(stray_file.exists());
}

#[test]
fn collect_orphans_on_missing_root_is_empty() {
    let scratch = TempDir::new().unwrap();
    let root = ScratchRoot::new(scratch.path().join("missing"), "rootcamp");
    assert!(root.collect_orphans().unwrap().is_empty());
}
