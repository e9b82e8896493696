use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::debug::DebugConfig;
use crate::root::{ContentConfig, SandboxConfig, ShellConfig, StorageConfig};

/// Main configuration structure for RootCamp
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RootCampConfig {
    /// Scratch root and naming of lab sandboxes
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Shell launched inside a lab
    #[serde(default)]
    pub shell: ShellConfig,

    /// External lesson content
    #[serde(default)]
    pub content: ContentConfig,

    /// Progress and settings persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Debug and tracing settings
    #[serde(default)]
    pub debug: DebugConfig,
}

impl RootCampConfig {
    pub fn validate(&self) -> Result<()> {
        self.sandbox
            .validate()
            .context("Invalid sandbox configuration")?;
        Ok(())
    }
}
