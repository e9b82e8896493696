//! Tokens substituted into lesson text at display and validation time.

use std::path::Path;

use crate::lesson::Lesson;

pub const SANDBOX_TOKEN: &str = "{SANDBOX}";
pub const SECRET_TOKEN: &str = "{SECRET_CODE}";
pub const COPY_SHORTCUT_TOKEN: &str = "{COPY_SHORTCUT}";
pub const PASTE_SHORTCUT_TOKEN: &str = "{PASTE_SHORTCUT}";

const LEGACY_ID_TOKEN: &str = "{uuid}";
/// Legacy spelling used by bundled lessons, whatever the configured scratch root.
const BUNDLED_LEGACY_TOKEN: &str = "/tmp/rootcamp-{uuid}";

/// Older content spells the sandbox as `<scratch-root>/<prefix>-{uuid}`,
/// e.g. `/tmp/rootcamp-{uuid}`. Built from the live `<root>/<prefix>-<id>`
/// path; `None` when the path does not have that shape.
pub fn legacy_sandbox_token(sandbox: &Path) -> Option<String> {
    let name = sandbox.file_name()?.to_str()?;
    let (prefix, id) = name.rsplit_once('-')?;
    if prefix.is_empty() || id.is_empty() {
        return None;
    }
    let token = sandbox.with_file_name(format!("{prefix}-{LEGACY_ID_TOKEN}"));
    Some(token.to_string_lossy().into_owned())
}

/// Replace sandbox tokens with the live sandbox path.
pub fn substitute_sandbox(text: &str, sandbox: &Path) -> String {
    let live = sandbox.to_string_lossy();
    let mut replaced = text.replace(SANDBOX_TOKEN, &live);
    if let Some(legacy) = legacy_sandbox_token(sandbox) {
        replaced = replaced.replace(&legacy, &live);
    }
    replaced.replace(BUNDLED_LEGACY_TOKEN, &live)
}

pub fn substitute_secret(text: &str, secret: &str) -> String {
    text.replace(SECRET_TOKEN, secret)
}

/// Whether the lesson asks for a generated secret code.
pub fn needs_secret(lesson: &Lesson) -> bool {
    lesson.instructions.contains(SECRET_TOKEN)
        || lesson
            .requirements
            .iter()
            .any(|requirement| requirement.expected.contains(SECRET_TOKEN))
}

pub fn copy_shortcut() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd + C"
    } else {
        "Ctrl + Shift + C"
    }
}

pub fn paste_shortcut() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd + V"
    } else {
        "Ctrl + Shift + V"
    }
}

/// Render lesson text for the user, filling in every token that has a value.
pub fn render_display(text: &str, sandbox: Option<&Path>, secret: Option<&str>) -> String {
    let mut rendered = text
        .replace(COPY_SHORTCUT_TOKEN, copy_shortcut())
        .replace(PASTE_SHORTCUT_TOKEN, paste_shortcut());
    if let Some(secret) = secret {
        rendered = substitute_secret(&rendered, secret);
    }
    if let Some(sandbox) = sandbox {
        rendered = substitute_sandbox(&rendered, sandbox);
    }
    rendered
}
