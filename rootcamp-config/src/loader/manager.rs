use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::constants::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use crate::loader::config::RootCampConfig;
use crate::loader::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};
use crate::root::home_data_dir;

/// Configuration manager for loading and validating configurations
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub(crate) config: RootCampConfig,
    config_path: Option<PathBuf>,
    pub(crate) layer_stack: ConfigLayerStack,
}

impl ConfigManager {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = config_path.trim();
            if !trimmed.is_empty() {
                return Self::load_from_file(trimmed).with_context(|| {
                    format!("Failed to load configuration from {CONFIG_PATH_ENV}={trimmed}")
                });
            }
        }

        Self::load_from_workspace(std::env::current_dir()?)
    }

    /// Default per-user config locations.
    pub fn home_config_paths() -> Vec<PathBuf> {
        vec![home_data_dir().join(CONFIG_FILE_NAME)]
    }

    /// Load configuration from a specific workspace
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        Self::load_layers(&Self::home_config_paths(), Some(workspace.as_ref()), None)
    }

    /// Load configuration from a specific file, still honouring the user layer.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layers(&Self::home_config_paths(), None, Some(path.as_ref()))
    }

    pub(crate) fn load_layers(
        home_paths: &[PathBuf],
        workspace: Option<&Path>,
        explicit_file: Option<&Path>,
    ) -> Result<Self> {
        let mut layer_stack = ConfigLayerStack::default();

        // 1. User home config (~/.rootcamp/rootcamp.toml)
        for home_config_path in home_paths {
            if home_config_path.exists()
                && let Ok(toml) = Self::load_toml_from_file(home_config_path)
            {
                layer_stack.push(ConfigLayerEntry::new(
                    ConfigLayerSource::User {
                        file: home_config_path.clone(),
                    },
                    toml,
                ));
            }
        }

        // 2. Workspace config (rootcamp.toml in the working directory)
        if let Some(workspace) = workspace {
            let workspace_config_path = workspace.join(CONFIG_FILE_NAME);
            if workspace_config_path.exists()
                && !home_paths.contains(&workspace_config_path)
                && let Ok(toml) = Self::load_toml_from_file(&workspace_config_path)
            {
                layer_stack.push(ConfigLayerEntry::new(
                    ConfigLayerSource::Workspace {
                        file: workspace_config_path,
                    },
                    toml,
                ));
            }
        }

        // 3. Explicitly requested file; unlike the other layers it must parse
        if let Some(path) = explicit_file {
            let toml = Self::load_toml_from_file(path)?;
            layer_stack.push(ConfigLayerEntry::new(
                ConfigLayerSource::Workspace {
                    file: path.to_path_buf(),
                },
                toml,
            ));
        }

        let config = Self::resolve(&layer_stack)?;
        let config_path = layer_stack
            .layers()
            .last()
            .and_then(|layer| layer.source.file().cloned());

        debug!(
            layers = layer_stack.layers().len(),
            config_path = ?config_path,
            "configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
            layer_stack,
        })
    }

    pub(crate) fn resolve(layer_stack: &ConfigLayerStack) -> Result<RootCampConfig> {
        if layer_stack.layers().is_empty() {
            let config = RootCampConfig::default();
            config
                .validate()
                .context("Default configuration failed validation")?;
            return Ok(config);
        }

        let config: RootCampConfig = layer_stack
            .effective_config()
            .try_into()
            .context("Failed to deserialize effective configuration")?;
        config
            .validate()
            .context("Configuration failed validation")?;
        Ok(config)
    }

    fn load_toml_from_file(path: &Path) -> Result<toml::Value> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(value)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &RootCampConfig {
        &self.config
    }

    /// Path of the highest-precedence file layer, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn layer_stack(&self) -> &ConfigLayerStack {
        &self.layer_stack
    }

    pub fn effective_config(&self) -> toml::Value {
        self.layer_stack.effective_config()
    }
}
