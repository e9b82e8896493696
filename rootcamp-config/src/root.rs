use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rootcamp_commons::expand_home;
use serde::{Deserialize, Serialize};

use crate::constants::{HOME_DIR_NAME, defaults};

/// Where lab sandboxes are created.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SandboxConfig {
    /// Parent directory for sandboxes; defaults to the system temp dir
    #[serde(default)]
    pub scratch_root: Option<String>,

    /// Name prefix shared by every sandbox directory
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    defaults::SANDBOX_PREFIX.to_string()
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            scratch_root: None,
            prefix: default_prefix(),
        }
    }
}

impl SandboxConfig {
    pub fn scratch_root_path(&self) -> PathBuf {
        match self.scratch_root.as_deref() {
            Some(raw) if !raw.trim().is_empty() => expand_home(raw.trim()),
            _ => std::env::temp_dir(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            bail!("sandbox.prefix must not be empty");
        }
        if prefix.contains(['/', '\\']) {
            bail!("sandbox.prefix must not contain path separators: {prefix}");
        }
        if !self.scratch_root_path().is_absolute() {
            bail!(
                "sandbox.scratch_root must be absolute: {}",
                self.scratch_root_path().display()
            );
        }
        Ok(())
    }
}

/// Interactive shell used for lab sessions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShellConfig {
    /// Shell program to exec inside the sandbox; defaults to `$SHELL`
    #[serde(default)]
    pub program: Option<String>,

    /// Always use plain bash, ignoring `program` and `$SHELL`
    #[serde(default)]
    pub use_basic_bash: bool,
}

impl ShellConfig {
    /// Resolve the shell program, honouring the basic-bash switch.
    pub fn resolve_program(&self, force_basic: bool) -> String {
        if force_basic || self.use_basic_bash {
            return "bash".to_string();
        }

        self.program
            .as_deref()
            .map(str::trim)
            .filter(|program| !program.is_empty())
            .map(ToOwned::to_owned)
            .or_else(|| {
                std::env::var("SHELL")
                    .ok()
                    .filter(|shell| !shell.trim().is_empty())
            })
            .unwrap_or_else(|| defaults::FALLBACK_SHELL.to_string())
    }
}

/// Optional external lesson content.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Directory of `*.json` lesson packs replacing the built-in lessons
    #[serde(default)]
    pub lessons_dir: Option<String>,

    /// Course file replacing the built-in course ordering
    #[serde(default)]
    pub course_file: Option<String>,
}

impl ContentConfig {
    pub fn lessons_dir_path(&self) -> Option<PathBuf> {
        self.lessons_dir.as_deref().map(expand_home)
    }

    pub fn course_file_path(&self) -> Option<PathBuf> {
        self.course_file.as_deref().map(expand_home)
    }
}

/// Location of persisted progress and settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl StorageConfig {
    pub fn data_dir_path(&self) -> PathBuf {
        match self.data_dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => home_data_dir(),
        }
    }
}

/// `~/.rootcamp`, or a relative `.rootcamp` when no home directory is known.
pub fn home_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .unwrap_or_else(|| Path::new(HOME_DIR_NAME).to_path_buf())
}
