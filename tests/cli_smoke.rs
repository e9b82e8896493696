use anyhow::Result;
use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// A `rootcamp` invocation isolated from the real home directory.
fn rootcamp(home: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("rootcamp")?;
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ROOTCAMP_CONFIG_PATH");
    Ok(cmd)
}

#[test]
fn help_command_succeeds() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lessons"));
    Ok(())
}

#[test]
fn lessons_lists_builtin_catalog() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .arg("lessons")
        .assert()
        .success()
        .stdout(predicate::str::contains("Where am I?"))
        .stdout(predicate::str::contains("Finding files by name"));
    Ok(())
}

#[test]
fn lessons_filters_by_level() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .args(["lessons", "--level", "beginner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Where am I?"))
        .stdout(predicate::str::contains("Finding files by name").not());
    Ok(())
}

#[test]
fn lessons_reports_empty_filter() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .args(["lessons", "--tag", "no-such-tag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No lessons match"));
    Ok(())
}

#[test]
fn progress_prints_overall_summary() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall"))
        .stdout(predicate::str::contains("By level"));
    Ok(())
}

#[test]
fn gc_removes_only_prefixed_sandboxes() -> Result<()> {
    let home = TempDir::new()?;
    let scratch = TempDir::new()?;
    scratch.child("rootcamp-abcd1234/nested/file.txt").write_str("x")?;
    scratch.child("unrelated").create_dir_all()?;

    rootcamp(&home)?
        .arg("gc")
        .arg("--scratch-root")
        .arg(scratch.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 sandbox"));

    scratch
        .child("rootcamp-abcd1234")
        .assert(predicate::path::missing());
    scratch.child("unrelated").assert(predicate::path::is_dir());
    Ok(())
}

#[test]
fn reset_clears_progress() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress cleared."));
    Ok(())
}

#[test]
fn invalid_config_is_rejected() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.child("broken.toml");
    config.write_str("[sandbox]\nprefix = \"\"\n")?;

    rootcamp(&home)?
        .arg("--config")
        .arg(config.path())
        .arg("lessons")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sandbox.prefix"));
    Ok(())
}

#[test]
fn interactive_mode_requires_terminal() -> Result<()> {
    let home = TempDir::new()?;
    rootcamp(&home)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive terminal"));
    Ok(())
}
