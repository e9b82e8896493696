use std::io;
use std::path::PathBuf;

use rootcamp_commons::PathEscape;

/// Failure while building a sandbox. Any partially built tree has already
/// been removed by the time one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("invalid sandbox path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error(transparent)]
    PathEscape(#[from] PathEscape),

    #[error("failed to create sandbox root {}: {source}", path.display())]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create symlink {} -> {target}: {source}", path.display())]
    Symlink {
        path: PathBuf,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove partial sandbox {}: {source}", path.display())]
    Reap {
        path: PathBuf,
        #[source]
        source: ReapError,
    },
}

/// Failure while removing a sandbox.
#[derive(Debug, thiserror::Error)]
pub enum ReapError {
    #[error("refusing to remove an empty path")]
    EmptyPath,

    #[error("refusing to remove {} outside the scratch root {anchor}", path.display())]
    OutsideScratchRoot { path: PathBuf, anchor: String },

    #[error("failed to remove {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
