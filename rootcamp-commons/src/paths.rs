use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

/// Normalize a path by resolving `.` and `..` components lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// A relative path that would leave the root it was joined onto.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path `{}` escapes its root", path.display())]
pub struct PathEscape {
    pub path: PathBuf,
}

/// Join `relative` onto `root` and verify the result stays inside `root`.
///
/// The check is purely lexical: absolute paths and `..` segments that climb
/// above the root are rejected, nothing is read from disk. An empty relative
/// path resolves to the root itself.
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, PathEscape> {
    let mut depth: usize = 0;
    let mut clean = PathBuf::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                clean.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(PathEscape {
                        path: relative.to_path_buf(),
                    });
                }
                clean.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathEscape {
                    path: relative.to_path_buf(),
                });
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Ok(root.to_path_buf());
    }

    Ok(root.join(clean))
}

/// Canonicalize the deepest ancestor of `path` (itself included) that exists.
///
/// Symlinks along the way are resolved, so the result is where a write below
/// `path` would actually land. A dangling symlink is an error.
pub fn canonicalize_existing(path: &Path) -> io::Result<PathBuf> {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        match fs::symlink_metadata(ancestor) {
            Ok(_) => return fs::canonicalize(ancestor),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor of {}", path.display()),
    ))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let Some(rest) = raw.strip_prefix('~') else {
        return PathBuf::from(raw);
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => {
            warn!(path = raw, "home directory unavailable; using path verbatim");
            PathBuf::from(raw)
        }
    }
}
