//! Local persistence for RootCamp.
//!
//! Documents are markdown files with an embedded JSON block so they stay
//! readable in an editor. Progress and settings each get one file under the
//! data directory.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

pub mod markdown;
pub mod progress;
pub mod settings;

pub use markdown::MarkdownStorage;
pub use progress::{MarkdownProgressStore, MemoryProgressStore, ProgressStore, UserProgress};
pub use settings::{Settings, SettingsStore};

/// Open the markdown progress store, falling back to memory when the data
/// directory cannot be used.
pub fn open_progress_store(data_dir: PathBuf) -> Arc<dyn ProgressStore> {
    match MarkdownProgressStore::open(data_dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!(error = %err, "progress will not be saved this session");
            Arc::new(MemoryProgressStore::new())
        }
    }
}
