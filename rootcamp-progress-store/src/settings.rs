use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::markdown::MarkdownStorage;

const SETTINGS_KEY: &str = "settings";

/// User-adjustable preferences persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Launch plain `bash` in labs instead of `$SHELL`
    #[serde(default)]
    pub use_basic_bash: bool,
}

/// Settings kept in `<data_dir>/settings.md`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    storage: MarkdownStorage,
}

impl SettingsStore {
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let storage = MarkdownStorage::new(data_dir);
        storage.init().context("Failed to initialize settings store")?;
        Ok(Self { storage })
    }

    pub fn get_settings(&self) -> Result<Settings> {
        Ok(self
            .storage
            .load_optional::<Settings>(SETTINGS_KEY)?
            .unwrap_or_default())
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.storage
            .store(SETTINGS_KEY, settings, "RootCamp Settings")
            .context("Failed to save settings")
    }

    pub fn set_use_basic_bash(&self, enabled: bool) -> Result<Settings> {
        let mut settings = self.get_settings()?;
        settings.use_basic_bash = enabled;
        self.save(&settings)?;
        Ok(settings)
    }
}
