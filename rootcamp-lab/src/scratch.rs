use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rootcamp_commons::normalize_path;
use rootcamp_config::SandboxConfig;
use tracing::{debug, error, info, warn};

use crate::error::ReapError;

/// The shared parent directory and name prefix of every sandbox.
///
/// This is the only anchor the reaper trusts: a path is removed only when it
/// is a direct child of `root` named `<prefix>-<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchRoot {
    root: PathBuf,
    prefix: String,
}

impl ScratchRoot {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: normalize_path(&root.into()),
            prefix: prefix.into().trim().to_string(),
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(config.scratch_root_path(), config.prefix.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path for a sandbox with the given id.
    pub fn sandbox_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}-{}", self.prefix, id))
    }

    /// `<root>/<prefix>-`, the string every sandbox path starts with.
    pub fn anchor(&self) -> String {
        self.sandbox_path("").to_string_lossy().into_owned()
    }

    /// Whether `path` names a sandbox directory under this root.
    pub fn owns(&self, path: &Path) -> bool {
        let Some(raw) = path.to_str() else {
            return false;
        };
        let Some(id) = raw.strip_prefix(&self.anchor()) else {
            return false;
        };
        !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
    }

    /// Remove a sandbox directory tree.
    ///
    /// Paths outside the scratch root are rejected without touching the
    /// filesystem. A missing directory is not an error, so repeated calls on
    /// the same path are fine.
    pub fn cleanup(&self, path: &Path) -> Result<(), ReapError> {
        if path.as_os_str().is_empty() {
            error!("sandbox reaper called with an empty path");
            return Err(ReapError::EmptyPath);
        }

        if !self.owns(path) {
            let anchor = self.anchor();
            error!(
                path = %path.display(),
                anchor = %anchor,
                "sandbox reaper refused a path outside the scratch root"
            );
            return Err(ReapError::OutsideScratchRoot {
                path: path.to_path_buf(),
                anchor,
            });
        }

        match fs::remove_dir_all(path) {
            Ok(()) => {
                info!(path = %path.display(), "sandbox removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "sandbox already gone");
                Ok(())
            }
            Err(source) => Err(ReapError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reap every `<prefix>-*` directory left in the scratch root, returning
    /// the removed paths. Entries that fail to delete are logged and skipped.
    pub fn collect_orphans(&self) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut reaped = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_dir() || !self.owns(&path) {
                continue;
            }

            match self.cleanup(&path) {
                Ok(()) => reaped.push(path),
                Err(err) => warn!(path = %path.display(), error = %err, "failed to reap orphan"),
            }
        }

        reaped.sort();
        Ok(reaped)
    }
}

impl Default for ScratchRoot {
    fn default() -> Self {
        Self::from_config(&SandboxConfig::default())
    }
}
