//! Configuration loader for RootCamp.
//!
//! Settings live in `rootcamp.toml`. The loader reads the user's home copy,
//! the copy in the working directory, an explicitly requested file, and any
//! runtime overrides, then deep-merges them in that order. Every section is
//! optional; a missing file yields [`RootCampConfig::default`].

pub mod constants;
pub mod debug;
pub mod loader;
pub mod root;

pub use debug::{DebugConfig, TraceLevel};
pub use loader::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};
pub use loader::{ConfigBuilder, ConfigManager, RootCampConfig, merge_toml_values};
pub use root::{ContentConfig, SandboxConfig, ShellConfig, StorageConfig};
