/// Name of the configuration file looked up in each layer.
pub const CONFIG_FILE_NAME: &str = "rootcamp.toml";

/// Per-user directory holding config, progress, and logs.
pub const HOME_DIR_NAME: &str = ".rootcamp";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ROOTCAMP_CONFIG_PATH";

pub mod defaults {
    pub const SANDBOX_PREFIX: &str = "rootcamp";
    pub const FALLBACK_SHELL: &str = "/bin/bash";
    pub const LOG_DIR_NAME: &str = "logs";
    pub const LOG_FILE_NAME: &str = "rootcamp.log";
}
