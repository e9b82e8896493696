//! Sandbox materialization and ownership.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rootcamp_commons::{PathEscape, canonicalize_existing, resolve_within};
use rootcamp_commons::slug::short_id;
use tracing::{debug, error, info, warn};

use crate::error::{ProvisionError, ReapError};
use crate::lesson::{Lesson, SandboxSpec};
use crate::scratch::ScratchRoot;

const SANDBOX_ID_LEN: usize = 8;
const MAX_ID_ATTEMPTS: usize = 16;

/// Slot holding the path of the sandbox currently in use.
///
/// Shared between the session that owns the sandbox and the interrupt handler.
/// Whoever takes the path out of the slot is the one that reaps it.
#[derive(Debug, Clone, Default)]
pub struct ActiveSandboxRegistry {
    slot: Arc<Mutex<Option<PathBuf>>>,
}

impl ActiveSandboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, path: &Path) {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.replace(path.to_path_buf()) {
            warn!(
                previous = %previous.display(),
                current = %path.display(),
                "replaced a still-registered sandbox"
            );
        }
    }

    /// Claim `path` for reaping. Returns false when someone else already took it.
    fn claim(&self, path: &Path) -> bool {
        let mut slot = self.slot.lock();
        match slot.as_deref() {
            Some(current) if current == path => {
                slot.take();
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Take whatever sandbox is registered, leaving the slot empty.
    pub fn take(&self) -> Option<PathBuf> {
        self.slot.lock().take()
    }

    pub fn current(&self) -> Option<PathBuf> {
        self.slot.lock().clone()
    }
}

/// Owning handle to a live sandbox directory. Dropping it reaps the tree.
#[derive(Debug)]
pub struct Sandbox {
    path: PathBuf,
    scratch: ScratchRoot,
    registry: ActiveSandboxRegistry,
    released: bool,
}

impl Sandbox {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the lab shell should start in.
    pub fn start_path(&self, lesson: &Lesson) -> PathBuf {
        get_start_path(&self.path, lesson)
    }

    /// Remove the sandbox now.
    pub fn reap(mut self) -> Result<(), ReapError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ReapError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if !self.registry.claim(&self.path) {
            debug!(path = %self.path.display(), "sandbox already claimed by another reaper");
            return Ok(());
        }
        self.scratch.cleanup(&self.path)
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            error!(path = %self.path.display(), error = %err, "failed to reap sandbox on drop");
        }
    }
}

/// `sandbox_path` joined with the lesson's start directory, or `sandbox_path`
/// itself when none is declared. A start directory that would leave the
/// sandbox also falls back to the root.
pub fn get_start_path(sandbox_path: &Path, lesson: &Lesson) -> PathBuf {
    lesson
        .sandbox
        .start_dir()
        .and_then(|dir| resolve_within(sandbox_path, Path::new(dir)).ok())
        .unwrap_or_else(|| sandbox_path.to_path_buf())
}

/// Every path of a [`SandboxSpec`], checked and normalized relative to the root.
#[derive(Debug, Default)]
struct Layout<'a> {
    dirs: Vec<PathBuf>,
    files: Vec<(PathBuf, &'a str)>,
    symlinks: Vec<(PathBuf, &'a str)>,
}

impl<'a> Layout<'a> {
    fn plan(spec: &'a SandboxSpec) -> Result<Self, ProvisionError> {
        let relative = |raw: &str| resolve_within(Path::new(""), Path::new(raw.trim()));
        let named = |raw: &str| -> Result<PathBuf, ProvisionError> {
            let path = relative(raw)?;
            if path.as_os_str().is_empty() {
                return Err(ProvisionError::InvalidPath {
                    path: raw.to_string(),
                    reason: "resolves to the sandbox root",
                });
            }
            Ok(path)
        };

        if let Some(start) = spec.start_dir() {
            relative(start)?;
        }

        let mut layout = Self::default();
        for dir in &spec.dirs {
            let dir = relative(dir)?;
            if !dir.as_os_str().is_empty() {
                layout.dirs.push(dir);
            }
        }
        for (path, content) in &spec.files {
            layout.files.push((named(path)?, content.as_str()));
        }
        for (link, target) in &spec.symlinks {
            layout.symlinks.push((named(link)?, target.as_str()));
        }
        Ok(layout)
    }
}

/// Builds sandboxes under a scratch root.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    scratch: ScratchRoot,
    registry: ActiveSandboxRegistry,
}

impl Materializer {
    pub fn new(scratch: ScratchRoot, registry: ActiveSandboxRegistry) -> Self {
        Self { scratch, registry }
    }

    pub fn scratch(&self) -> &ScratchRoot {
        &self.scratch
    }

    pub fn registry(&self) -> &ActiveSandboxRegistry {
        &self.registry
    }

    /// Create and populate a fresh sandbox for `lesson`.
    ///
    /// Every declared path is checked before anything is written. If
    /// population fails halfway, the partial tree is removed before the error
    /// is returned.
    pub fn create(&self, lesson: &Lesson) -> Result<Sandbox, ProvisionError> {
        let layout = Layout::plan(&lesson.sandbox)?;
        let path = self.allocate()?;
        self.registry.register(&path);

        if let Err(err) = populate(&path, &layout) {
            warn!(lesson = %lesson.id, path = %path.display(), error = %err, "sandbox population failed");
            if self.registry.claim(&path)
                && let Err(source) = self.scratch.cleanup(&path)
            {
                error!(path = %path.display(), error = %source, "partial sandbox left behind");
                return Err(ProvisionError::Reap { path, source });
            }
            return Err(err);
        }

        info!(lesson = %lesson.id, path = %path.display(), "sandbox created");

        Ok(Sandbox {
            path,
            scratch: self.scratch.clone(),
            registry: self.registry.clone(),
            released: false,
        })
    }

    fn allocate(&self) -> Result<PathBuf, ProvisionError> {
        let root = self.scratch.root();
        fs::create_dir_all(root).map_err(|source| ProvisionError::CreateRoot {
            path: root.to_path_buf(),
            source,
        })?;

        let mut last_collision = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let path = self.scratch.sandbox_path(&short_id(SANDBOX_ID_LEN));
            match create_sandbox_dir(&path) {
                Ok(()) => return Ok(path),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "sandbox id collision, retrying");
                    last_collision = Some((path, err));
                }
                Err(source) => return Err(ProvisionError::CreateRoot { path, source }),
            }
        }

        let (path, source) = last_collision.unwrap_or_else(|| {
            (
                self.scratch.sandbox_path(""),
                io::Error::from(io::ErrorKind::AlreadyExists),
            )
        });
        Err(ProvisionError::CreateRoot { path, source })
    }
}

fn populate(root: &Path, layout: &Layout<'_>) -> Result<(), ProvisionError> {
    let fence = Fence::new(root)?;

    for dir in &layout.dirs {
        let path = fence.check(dir)?;
        fs::create_dir_all(&path).map_err(|source| ProvisionError::CreateDir { path, source })?;
    }

    for (relative, content) in &layout.files {
        let path = fence.check(relative)?;
        ensure_parent(&path)?;
        write_file(&path, content).map_err(|source| ProvisionError::WriteFile { path, source })?;
    }

    for (relative, target) in &layout.symlinks {
        let path = fence.check_parent(relative)?;
        ensure_parent(&path)?;
        create_symlink(target, &path).map_err(|source| ProvisionError::Symlink {
            path,
            target: (*target).to_string(),
            source,
        })?;
    }

    Ok(())
}

/// Keeps writes inside the sandbox once earlier entries may have planted
/// symlinks on the way to later ones.
struct Fence<'a> {
    root: &'a Path,
    canonical: PathBuf,
}

impl<'a> Fence<'a> {
    fn new(root: &'a Path) -> Result<Self, ProvisionError> {
        let canonical = fs::canonicalize(root).map_err(|source| ProvisionError::CreateRoot {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root, canonical })
    }

    /// Join `relative` onto the root, refusing it if the deepest existing
    /// ancestor resolves outside the sandbox.
    fn check(&self, relative: &Path) -> Result<PathBuf, ProvisionError> {
        let path = self.root.join(relative);
        self.ensure_inside(&path, relative)?;
        Ok(path)
    }

    /// Like [`Fence::check`], but the final component is left unresolved
    /// because it is about to become a symlink itself.
    fn check_parent(&self, relative: &Path) -> Result<PathBuf, ProvisionError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            self.ensure_inside(parent, relative)?;
        }
        Ok(path)
    }

    fn ensure_inside(&self, path: &Path, relative: &Path) -> Result<(), ProvisionError> {
        let resolved =
            canonicalize_existing(path).map_err(|source| ProvisionError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
        if resolved.starts_with(&self.canonical) {
            Ok(())
        } else {
            debug!(path = %path.display(), resolved = %resolved.display(), "write would leave the sandbox");
            Err(PathEscape {
                path: relative.to_path_buf(),
            }
            .into())
        }
    }
}

fn ensure_parent(path: &Path) -> Result<(), ProvisionError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent).map_err(|source| ProvisionError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn create_sandbox_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_sandbox_dir(path: &Path) -> io::Result<()> {
    fs::create_dir(path)
}

#[cfg(unix)]
fn write_file(path: &Path, content: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    file.write_all(content.as_bytes())
}

#[cfg(not(unix))]
fn write_file(path: &Path, content: &str) -> io::Result<()> {
    fs::write(path, content)
}

#[cfg(unix)]
fn create_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &str, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
