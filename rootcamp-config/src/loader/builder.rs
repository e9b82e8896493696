use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::loader::layers::{ConfigLayerEntry, ConfigLayerSource};
use crate::loader::manager::ConfigManager;

/// Builder for creating a [`ConfigManager`] with custom overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    workspace: Option<PathBuf>,
    config_file: Option<PathBuf>,
    home_paths: Option<Vec<PathBuf>>,
    cli_overrides: Vec<(String, toml::Value)>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workspace directory searched for `rootcamp.toml`.
    pub fn workspace(mut self, path: PathBuf) -> Self {
        self.workspace = Some(path);
        self
    }

    /// Use a specific configuration file in addition to the user layer.
    pub fn config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Replace the per-user config locations.
    pub fn home_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.home_paths = Some(paths);
        self
    }

    /// Add a CLI override (e.g., "sandbox.prefix", "lab").
    pub fn cli_override(mut self, key: impl Into<String>, value: toml::Value) -> Self {
        self.cli_overrides.push((key.into(), value));
        self
    }

    pub fn build(self) -> Result<ConfigManager> {
        let home_paths = self
            .home_paths
            .clone()
            .unwrap_or_else(ConfigManager::home_config_paths);
        let workspace = match (&self.workspace, &self.config_file) {
            (Some(workspace), _) => Some(workspace.clone()),
            (None, Some(_)) => None,
            (None, None) => Some(
                std::env::current_dir().context("Failed to resolve current directory")?,
            ),
        };

        let mut manager = ConfigManager::load_layers(
            &home_paths,
            workspace.as_deref(),
            self.config_file.as_deref(),
        )?;

        if !self.cli_overrides.is_empty() {
            let mut runtime_toml = toml::Table::new();
            for (key, value) in self.cli_overrides {
                Self::insert_dotted_key(&mut runtime_toml, &key, value);
            }

            manager.layer_stack.push(ConfigLayerEntry::new(
                ConfigLayerSource::Runtime,
                toml::Value::Table(runtime_toml),
            ));
            manager.config = ConfigManager::resolve(&manager.layer_stack)
                .context("Configuration failed validation after runtime overrides")?;
        }

        Ok(manager)
    }

    fn insert_dotted_key(table: &mut toml::Table, key: &str, value: toml::Value) {
        let mut parts = key.split('.').peekable();
        let mut current = table;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                current.insert(part.to_string(), value);
                return;
            }

            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if !entry.is_table() {
                *entry = toml::Value::Table(toml::Table::new());
            }
            let toml::Value::Table(next) = entry else {
                return;
            };
            current = next;
        }
    }
}
