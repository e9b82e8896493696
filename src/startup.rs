use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rootcamp_config::constants::CONFIG_PATH_ENV;
use rootcamp_config::{ConfigBuilder, ConfigManager, ShellConfig};
use rootcamp_core::ContentRepository;
use rootcamp_lab::{ActiveSandboxRegistry, Materializer, ScratchRoot};
use rootcamp_progress_store::{ProgressStore, SettingsStore, open_progress_store};
use tracing::{debug, warn};

use crate::cli::Cli;

/// Picks the lab shell from config and the persisted settings, read fresh
/// each time a lab is about to start.
#[derive(Debug, Clone)]
pub struct ShellChoice {
    config: ShellConfig,
    settings: Option<SettingsStore>,
}

impl ShellChoice {
    pub fn program(&self) -> String {
        let saved_basic = self
            .settings
            .as_ref()
            .and_then(|store| match store.get_settings() {
                Ok(settings) => Some(settings.use_basic_bash),
                Err(err) => {
                    warn!(error = %err, "failed to read settings");
                    None
                }
            })
            .unwrap_or(false);
        self.config.resolve_program(saved_basic)
    }
}

/// Everything the commands and screens share, built once from the CLI.
pub struct StartupContext {
    pub data_dir: PathBuf,
    pub content: Arc<ContentRepository>,
    pub progress: Arc<dyn ProgressStore>,
    pub settings: Option<SettingsStore>,
    pub scratch: ScratchRoot,
    pub registry: ActiveSandboxRegistry,
    pub shell: ShellChoice,
}

/// Layer the configuration files and apply the CLI overrides.
pub fn load_config(args: &Cli) -> Result<ConfigManager> {
    let workspace = std::env::current_dir().context("Failed to resolve current directory")?;
    let mut builder = ConfigBuilder::new().workspace(workspace.clone());

    if let Some(path) = explicit_config_path(args) {
        builder = builder.config_file(resolve_against(&workspace, &path));
    }
    if let Some(root) = &args.scratch_root {
        let root = resolve_against(&workspace, root);
        builder = builder.cli_override(
            "sandbox.scratch_root",
            toml::Value::String(root.display().to_string()),
        );
    }
    if args.basic_shell {
        builder = builder.cli_override("shell.use_basic_bash", toml::Value::Boolean(true));
    }

    builder.build().context("Failed to load configuration")
}

impl StartupContext {
    pub fn from_config(manager: &ConfigManager) -> Result<Self> {
        let config = manager.config();

        let content = ContentRepository::load(&config.content)
            .context("Failed to load lesson content")?;

        let data_dir = config.storage.data_dir_path();
        let progress = open_progress_store(data_dir.clone());
        let settings = match SettingsStore::open(data_dir.clone()) {
            Ok(store) => Some(store),
            Err(err) => {
                warn!(error = %err, "settings will not be saved this session");
                None
            }
        };

        let scratch = ScratchRoot::from_config(&config.sandbox);
        debug!(
            config = ?manager.config_path(),
            scratch_root = %scratch.root().display(),
            data_dir = %data_dir.display(),
            "startup context ready"
        );

        Ok(Self {
            shell: ShellChoice {
                config: config.shell.clone(),
                settings: settings.clone(),
            },
            data_dir,
            content: Arc::new(content),
            progress,
            settings,
            scratch,
            registry: ActiveSandboxRegistry::new(),
        })
    }

    /// A materializer over the shared scratch root and registry.
    pub fn materializer(&self) -> Materializer {
        Materializer::new(self.scratch.clone(), self.registry.clone())
    }
}

fn explicit_config_path(args: &Cli) -> Option<PathBuf> {
    args.config.clone().or_else(|| {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    })
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_paths_resolve_against_workspace() {
        let base = Path::new("/work");
        assert_eq!(
            resolve_against(base, Path::new("labs")),
            PathBuf::from("/work/labs")
        );
        assert_eq!(
            resolve_against(base, Path::new("/tmp/labs")),
            PathBuf::from("/tmp/labs")
        );
    }

    #[test]
    fn basic_shell_switch_wins_over_configured_program() {
        let choice = ShellChoice {
            config: ShellConfig {
                program: Some("/bin/zsh".to_string()),
                use_basic_bash: true,
            },
            settings: None,
        };
        assert_eq!(choice.program(), "bash");
    }

    #[test]
    fn saved_setting_selects_basic_bash() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path().to_path_buf()).unwrap();
        store.set_use_basic_bash(true).unwrap();

        let choice = ShellChoice {
            config: ShellConfig {
                program: Some("/bin/zsh".to_string()),
                use_basic_bash: false,
            },
            settings: Some(store),
        };
        assert_eq!(choice.program(), "bash");
    }
}
