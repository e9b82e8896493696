use std::process::Command;

use anyhow::{Context, Result};
use rootcamp_core::ShellRequest;
use tracing::{debug, info};

use super::signal::HandoffFlag;

/// Interpreter for the banner script; the learner's own shell is exec'd from it.
const LAUNCHER: &str = "bash";

/// The command that runs a lab, without spawning it.
pub fn lab_command(request: &ShellRequest) -> Command {
    let mut command = Command::new(LAUNCHER);
    command
        .arg("-c")
        .arg(request.script())
        .current_dir(&request.working_dir)
        .env("PS1", request.prompt());
    command
}

/// Run the lab shell in the foreground until the learner exits.
///
/// An error means the shell never started; how it exited is not judged.
pub fn launch(request: &ShellRequest, handoff: &HandoffFlag) -> Result<()> {
    let _handoff = handoff.begin();
    info!(
        sandbox = %request.sandbox_path.display(),
        program = %request.program,
        "starting lab shell"
    );

    let status = lab_command(request)
        .status()
        .with_context(|| format!("failed to spawn {LAUNCHER}"))?;

    debug!(?status, "lab shell exited");
    Ok(())
}
